//! Common types for Roomtone
//!
//! Sample format and the port declarations shared by both engines and the
//! host backend.

/// Audio sample type (32-bit float, the host's native port format)
pub type Sample = f32;

/// Channel count of the capture/playback buffers (interleaved L/R)
pub const STEREO_CHANNELS: usize = 2;

/// Maximum number of ports an engine may declare in each direction
pub const MAX_PORTS_PER_DIRECTION: usize = 2;

/// Direction of a host port, seen from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// Host delivers samples to the engine
    Input,
    /// Engine writes samples for the host
    Output,
}

/// A named port an engine declares at startup
///
/// The host owns the actual port; the engine only ever sees the per-block
/// sample slices fetched through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortBinding {
    pub name: &'static str,
    pub direction: PortDirection,
}

impl PortBinding {
    /// Declare an input port
    pub const fn input(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Input,
        }
    }

    /// Declare an output port
    pub const fn output(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Output,
        }
    }
}

impl std::fmt::Display for PortBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dir = match self.direction {
            PortDirection::Input => "in",
            PortDirection::Output => "out",
        };
        write!(f, "{} ({})", self.name, dir)
    }
}

/// Count the ports of a layout going in `direction`
pub fn count_ports(ports: &[PortBinding], direction: PortDirection) -> usize {
    ports.iter().filter(|p| p.direction == direction).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_constructors() {
        let p = PortBinding::input("in1");
        assert_eq!(p.name, "in1");
        assert_eq!(p.direction, PortDirection::Input);
        assert_eq!(PortBinding::output("out1").direction, PortDirection::Output);
    }

    #[test]
    fn test_count_ports() {
        const LAYOUT: &[PortBinding] = &[
            PortBinding::input("a"),
            PortBinding::input("b"),
            PortBinding::output("c"),
        ];
        assert_eq!(count_ports(LAYOUT, PortDirection::Input), 2);
        assert_eq!(count_ports(LAYOUT, PortDirection::Output), 1);
    }

    #[test]
    fn test_port_display() {
        assert_eq!(PortBinding::output("out").to_string(), "out (out)");
    }
}
