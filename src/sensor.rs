use nalgebra::Vector3;

/// Kind of data carried by an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorType {
    /// Magnetic field, microtesla
    MagneticField = 2,
}

/// A single timestamped magnetometer reading
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MagneticEvent {
    /// Size of this structure in bytes
    pub version: i32,
    /// Identifier given to the driver at construction
    pub sensor_id: i32,
    /// Always [`SensorType::MagneticField`]
    ///
    /// [`SensorType::MagneticField`]: ./enum.SensorType.html
    pub sensor_type: SensorType,
    /// Milliseconds, as supplied by the caller
    pub timestamp: u32,
    /// Bias corrected field in microtesla
    pub magnetic: Vector3<f32>,
}

/// Static description of the sensor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorDescriptor {
    /// Chip name
    pub name: &'static str,
    /// Descriptor version
    pub version: i32,
    /// Identifier given to the driver at construction
    pub sensor_id: i32,
    /// Kind of data reported
    pub sensor_type: SensorType,
    /// Upper bound, microtesla
    pub max_value: f32,
    /// Lower bound, microtesla
    pub min_value: f32,
    /// Microtesla per LSB
    pub resolution: f32,
    /// Minimum delay between events in microseconds, 0 when unpaced
    pub min_delay: i32,
}
