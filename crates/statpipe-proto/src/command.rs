//! Typed outbound commands
//!
//! One `Command` variant per query kind the pipe can issue. Commands are
//! immutable once constructed; the dispatcher either transmits the encoded
//! frame immediately or moves it into the outbound queue.

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::tags;

/// Shaper node identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Site identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteId(pub u64);

/// Circuit identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CircuitId(pub u64);

/// Vendor device identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub u64);

/// Inclusive query window, Unix seconds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Window start (Unix seconds, inclusive)
    pub start: i64,
    /// Window end (Unix seconds, inclusive)
    pub end: i64,
}

impl DateRange {
    /// Build a range from explicit bounds.
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// A well-formed range has non-negative bounds in order.
    pub fn is_well_formed(&self) -> bool {
        self.start >= 0 && self.start <= self.end
    }
}

/// Outbound command variants - all queries the pipe can send.
///
/// Field order within each variant is the wire order.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Present a session token for this connection
    SetToken { token: Vec<u8> },
    /// Log in with a credential pair
    Login { username: String, password: String },
    /// Shaper node status
    NodeStatus,
    /// Packet-loss chart, whole network
    PacketChart { range: DateRange },
    /// Packet-loss chart for one node
    PacketChartForNode { range: DateRange, node: NodeId },
    /// Throughput chart, whole network
    ThroughputChart { range: DateRange },
    /// Throughput chart for one site
    ThroughputChartForSite { range: DateRange, site: SiteId },
    /// Throughput chart for one node
    ThroughputChartForNode { range: DateRange, node: NodeId },
    /// Throughput chart for one circuit
    ThroughputChartForCircuit { range: DateRange, circuit: CircuitId },
    /// RTT chart, whole network
    RttChart { range: DateRange },
    /// RTT histogram, whole network
    RttHistogram { range: DateRange },
    /// RTT chart for one site
    RttChartForSite { range: DateRange, site: SiteId },
    /// RTT chart for one node
    RttChartForNode { range: DateRange, node: NodeId },
    /// RTT chart for one circuit
    RttChartForCircuit { range: DateRange, circuit: CircuitId },
    /// CPU/RAM performance chart for one node
    NodePerfChart { range: DateRange, node: NodeId },
    /// Stacked per-child throughput under one site
    SiteStack { range: DateRange, site: SiteId },
    /// RTT heat map rooted at the network root
    RootHeat { range: DateRange },
    /// RTT heat map rooted at one site
    SiteHeat { range: DateRange, site: SiteId },
    /// Topology tree; `None` roots at the network root
    Tree { parent: Option<SiteId> },
    /// Detail record for one site
    SiteInfo { site: SiteId },
    /// Parent chain of one site
    SiteParents { site: SiteId },
    /// Parent chain of one circuit
    CircuitParents { circuit: CircuitId },
    /// Parent chain of the network root
    RootParents,
    /// Free-text search
    Search { term: String },
    /// Detail record for one circuit
    CircuitInfo { circuit: CircuitId },
    /// Vendor device records for one device
    ExtDeviceInfo { device: DeviceId },
    /// Signal/noise graph for one device
    ExtSnrGraph { range: DateRange, device: DeviceId },
    /// Capacity graph for one device
    ExtCapacityGraph { range: DateRange, device: DeviceId },
}

impl Command {
    /// The wire tag this variant encodes under.
    pub fn tag(&self) -> u16 {
        match self {
            Command::SetToken { .. } => tags::CMD_SET_TOKEN,
            Command::Login { .. } => tags::CMD_LOGIN,
            Command::NodeStatus => tags::CMD_NODE_STATUS,
            Command::PacketChart { .. } => tags::CMD_PACKET_CHART,
            Command::PacketChartForNode { .. } => tags::CMD_PACKET_CHART_FOR_NODE,
            Command::ThroughputChart { .. } => tags::CMD_THROUGHPUT_CHART,
            Command::ThroughputChartForSite { .. } => tags::CMD_THROUGHPUT_CHART_FOR_SITE,
            Command::ThroughputChartForNode { .. } => tags::CMD_THROUGHPUT_CHART_FOR_NODE,
            Command::ThroughputChartForCircuit { .. } => tags::CMD_THROUGHPUT_CHART_FOR_CIRCUIT,
            Command::RttChart { .. } => tags::CMD_RTT_CHART,
            Command::RttHistogram { .. } => tags::CMD_RTT_HISTOGRAM,
            Command::RttChartForSite { .. } => tags::CMD_RTT_CHART_FOR_SITE,
            Command::RttChartForNode { .. } => tags::CMD_RTT_CHART_FOR_NODE,
            Command::RttChartForCircuit { .. } => tags::CMD_RTT_CHART_FOR_CIRCUIT,
            Command::NodePerfChart { .. } => tags::CMD_NODE_PERF_CHART,
            Command::SiteStack { .. } => tags::CMD_SITE_STACK,
            Command::RootHeat { .. } => tags::CMD_ROOT_HEAT,
            Command::SiteHeat { .. } => tags::CMD_SITE_HEAT,
            Command::Tree { .. } => tags::CMD_TREE,
            Command::SiteInfo { .. } => tags::CMD_SITE_INFO,
            Command::SiteParents { .. } => tags::CMD_SITE_PARENTS,
            Command::CircuitParents { .. } => tags::CMD_CIRCUIT_PARENTS,
            Command::RootParents => tags::CMD_ROOT_PARENTS,
            Command::Search { .. } => tags::CMD_SEARCH,
            Command::CircuitInfo { .. } => tags::CMD_CIRCUIT_INFO,
            Command::ExtDeviceInfo { .. } => tags::CMD_EXT_DEVICE_INFO,
            Command::ExtSnrGraph { .. } => tags::CMD_EXT_SNR_GRAPH,
            Command::ExtCapacityGraph { .. } => tags::CMD_EXT_CAPACITY_GRAPH,
        }
    }
}
