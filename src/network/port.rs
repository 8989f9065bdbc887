//! Ports connect components to buses.
use super::bus::BusID;

/// The role a port plays for its component.
///
/// Flows are stored with withdrawal from the bus counted as positive. The role determines the sign
/// needed to read a flow as a positive quantity (e.g. energy produced at an output port).
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum PortRole {
    /// Energy is withdrawn from the bus (fuel input, load consumption)
    Input,
    /// The main output of the component
    PrimaryOutput,
    /// An additional output of a multi-port link (e.g. heat from a CHP)
    SecondaryOutput(usize),
}

impl PortRole {
    /// The factor which converts a raw flow at this port into a positive quantity
    pub fn sign(self) -> f64 {
        match self {
            Self::Input => 1.0,
            Self::PrimaryOutput | Self::SecondaryOutput(_) => -1.0,
        }
    }

    /// Get the role of port `index` of a link with the given efficiency.
    ///
    /// Port 0 is always the input. Other ports are outputs unless their efficiency is negative, in
    /// which case they draw an additional input (e.g. electricity for a carbon capture unit).
    pub fn for_link_port(index: usize, efficiency: f64) -> Self {
        match index {
            0 => Self::Input,
            _ if efficiency < 0.0 => Self::Input,
            1 => Self::PrimaryOutput,
            n => Self::SecondaryOutput(n),
        }
    }
}

/// A connection between a component and a bus
#[derive(PartialEq, Debug, Clone)]
pub struct Port {
    /// The bus the port is connected to, if any
    pub bus: Option<BusID>,
    /// The conversion efficiency from port 0 to this port (1.0 for port 0)
    pub efficiency: f64,
    /// What the port does
    pub role: PortRole,
}

impl Port {
    /// Whether the port is connected to the bus with the given name
    pub fn is_connected_to(&self, bus: &str) -> bool {
        self.bus.as_ref().is_some_and(|b| b.as_str() == bus)
    }
}
