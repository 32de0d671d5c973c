// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Acquisition pipeline.
//!
//! [`OpticalBoard`] owns the I2C bus, a delay source, the multiplexer and expander handles and the
//! [`SensorRegistry`]. A request for one (well, mode) pair runs end to end:
//!
//! 1. resolve the hardware route,
//! 2. switch the well's LED on,
//! 3. select the sensor's multiplexer channel,
//! 4. load the stored profile for that mode into the sensor,
//! 5. auto-range,
//! 6. tear down: release the multiplexer and switch the LED off,
//! 7. store the final profile and the packed reading.
//!
//! Teardown runs whether or not steps 2 to 5 succeeded. On error nothing is stored.

use embedded_hal::{delay::DelayNs, i2c::I2c};
use log::{debug, info, warn};

use crate::addressing::{resolve, Expander, Route};
use crate::calibration::{Calibration, Calibrator, LightSensor, Profile};
use crate::config::{BoardConfig, CalibrationConfig, EXPANDER_COUNT, MUX_COUNT};
use crate::drivers::{tsl2591, Mcp23017, Tca9548a, Tsl2591};
use crate::error::Error;
use crate::reading::PackedReading;
use crate::registry::{Mode, SensorRegistry, WellIndex};

/// A sensor bound to the bus for the duration of one calibration run.
///
/// Its multiplexer channel must already be selected.
pub struct ActiveSensor<'a, I2C, D> {
    sensor: &'a mut Tsl2591,
    i2c: &'a mut I2C,
    delay: &'a mut D,
    config: &'a CalibrationConfig,
}

impl<'a, I2C: I2c, D: DelayNs> ActiveSensor<'a, I2C, D> {
    pub fn new(
        sensor: &'a mut Tsl2591,
        i2c: &'a mut I2C,
        delay: &'a mut D,
        config: &'a CalibrationConfig,
    ) -> Self {
        Self {
            sensor,
            i2c,
            delay,
            config,
        }
    }
}

impl<I2C: I2c, D: DelayNs> LightSensor for ActiveSensor<'_, I2C, D> {
    type Error = Error<I2C::Error>;

    fn profile(&self) -> Profile {
        Profile::new(self.sensor.gain(), self.sensor.integration_time())
    }

    /// Sleep, write gain and time, wake, then let one full integration elapse.
    fn apply(&mut self, profile: Profile) -> Result<(), Self::Error> {
        self.sensor.sleep(self.i2c)?;
        self.sensor.configure(self.i2c, profile.gain, profile.time)?;
        self.sensor.wake(self.i2c)?;
        self.delay
            .delay_ms(profile.time.millis() + self.config.settle_margin_ms);
        Ok(())
    }

    fn sample(&mut self) -> Result<u16, Self::Error> {
        let (ch0, _) = self.sensor.read_channels(
            self.i2c,
            self.delay,
            self.config.status_poll_budget,
            self.config.status_poll_interval_us,
        )?;
        Ok(ch0)
    }
}

/// The sensing board and both LED boards behind one I2C bus.
pub struct OpticalBoard<I2C, D> {
    i2c: I2C,
    delay: D,
    muxes: [Tca9548a; MUX_COUNT],
    expanders: [Mcp23017; EXPANDER_COUNT],
    registry: SensorRegistry,
    calibrator: Calibrator,
    config: CalibrationConfig,
}

impl<I2C, D> OpticalBoard<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, config: &BoardConfig) -> Self {
        Self {
            i2c,
            delay,
            muxes: config.mux_addresses.map(Tca9548a::new),
            expanders: config.expander_addresses.map(Mcp23017::new),
            registry: SensorRegistry::new(),
            calibrator: Calibrator::new(config.calibration),
            config: config.calibration,
        }
    }

    /// Bring the boards to a known state.
    ///
    /// Every expander becomes all-outputs-low and every multiplexer is released; errors there are
    /// fatal. Each sensor is then powered up with its handle's settings and identified. A sensor
    /// that does not answer is logged and skipped. Returns how many sensors answered.
    pub fn init(&mut self) -> Result<usize, Error<I2C::Error>> {
        for exp in self.expanders.iter() {
            exp.init_outputs_low(&mut self.i2c)?;
        }
        for mux in self.muxes.iter() {
            mux.disable_all(&mut self.i2c)?;
        }

        let mut found = 0;
        for well in WellIndex::all() {
            let route = resolve(well, Mode::OpticalDensity);
            let res = self.init_sensor(well, &route);
            let released = self.muxes[route.mux as usize].disable_all(&mut self.i2c);
            match res {
                Ok(id) if id == tsl2591::DEVICE_ID => found += 1,
                Ok(id) => warn!("well {}: unexpected sensor id {:#04x}", well.get(), id),
                Err(e) => warn!("well {}: sensor init failed: {:?}", well.get(), e),
            }
            released?;
        }

        info!("optical board up, {} of 32 sensors", found);
        Ok(found)
    }

    fn init_sensor(&mut self, well: WellIndex, route: &Route) -> Result<u8, Error<I2C::Error>> {
        self.muxes[route.mux as usize].select(&mut self.i2c, route.channel)?;
        let sensor = self.registry.sensor_mut(well);
        sensor.init(&mut self.i2c)?;
        sensor.read_id(&mut self.i2c)
    }

    /// Take a calibrated reading for one (well, mode) pair.
    pub fn acquire(
        &mut self,
        well: WellIndex,
        mode: Mode,
    ) -> Result<PackedReading, Error<I2C::Error>> {
        let route = resolve(well, mode);

        let measured = self.measure(well, mode, &route);
        let torn_down = self.teardown(&route);

        let cal = measured?;
        torn_down?;

        self.registry.set_profile(well, mode, cal.profile);
        let reading = PackedReading::pack(cal.profile.gain, cal.profile.time, cal.raw);
        self.registry.set_reading(well, mode, reading);

        debug!(
            "well {} {:?}: {:?} -> {:#08x}",
            well.get(),
            mode,
            cal.outcome,
            reading.bits()
        );
        Ok(reading)
    }

    fn measure(
        &mut self,
        well: WellIndex,
        mode: Mode,
        route: &Route,
    ) -> Result<Calibration, Error<I2C::Error>> {
        self.expander(route.expander)
            .set_pin(&mut self.i2c, route.pin, true)?;
        self.muxes[route.mux as usize].select(&mut self.i2c, route.channel)?;

        let stored = self.registry.profile(well, mode);
        let mut active = ActiveSensor::new(
            self.registry.sensor_mut(well),
            &mut self.i2c,
            &mut self.delay,
            &self.config,
        );
        active.apply(stored)?;
        self.calibrator.run(&mut active)
    }

    /// Release the multiplexer, then switch the LED off. Both steps always run; the first error
    /// is reported.
    fn teardown(&mut self, route: &Route) -> Result<(), Error<I2C::Error>> {
        let released = self.muxes[route.mux as usize].disable_all(&mut self.i2c);
        let dark = self
            .expander(route.expander)
            .set_pin(&mut self.i2c, route.pin, false);
        released.and(dark)
    }

    #[inline]
    fn expander(&self, which: Expander) -> Mcp23017 {
        self.expanders[which.index()]
    }

    /// Drive one well's LED directly.
    pub fn set_led(&mut self, well: WellIndex, mode: Mode, on: bool) -> Result<(), Error<I2C::Error>> {
        let route = resolve(well, mode);
        self.expander(route.expander)
            .set_pin(&mut self.i2c, route.pin, on)
    }

    /// Read back one well's LED from the expander latch.
    pub fn led_state(&mut self, well: WellIndex, mode: Mode) -> Result<bool, Error<I2C::Error>> {
        let route = resolve(well, mode);
        self.expander(route.expander).pin(&mut self.i2c, route.pin)
    }

    /// Every output of every expander on or off.
    pub fn set_all_leds(&mut self, on: bool) -> Result<(), Error<I2C::Error>> {
        let value = if on { 0xFFFF } else { 0x0000 };
        for exp in self.expanders.iter() {
            exp.set_outputs(&mut self.i2c, value)?;
        }
        Ok(())
    }

    /// Mark every sensor handle as powered down, e.g. after the sensor rail was cut.
    pub fn sensors_lost_power(&mut self) {
        self.registry.reset_sensors();
    }

    #[inline]
    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    #[inline]
    pub fn registry_mut(&mut self) -> &mut SensorRegistry {
        &mut self.registry
    }

    #[inline]
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }

    #[inline]
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}
