//! Typed inbound responses
//!
//! A `Response` is decoded from an inbound frame and routed to the UI
//! consumer registered for its `ResponseKind`. Routing is by kind only -
//! the protocol carries no per-request correlation token, so two
//! concurrent requests of the same kind cannot have their replies told
//! apart. Consumers must tolerate that ambiguity.
//!
//! Scoped chart requests (per site / node / circuit) share the unscoped
//! response kind: an `RttChartForCircuit` command is answered with an
//! `RttChart` response.

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::tags;

// =============================================================================
// Payload structs
// =============================================================================

/// Token accepted; carries the display name the token maps to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthOk {
    /// Display name of the authenticated user
    pub name: String,
}

/// Login succeeded; carries the session token for subsequent connections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginOk {
    /// Opaque session token
    pub token: String,
    /// Display name of the authenticated user
    pub name: String,
}

/// One shaper node's liveness entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeStatusEntry {
    /// Node identifier
    pub node_id: u64,
    /// Human-readable node name
    pub node_name: String,
    /// Seconds since the node last reported in
    pub last_seen_sec: i64,
}

/// Shaper node status table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeStatusData {
    /// One entry per known node
    pub nodes: Vec<NodeStatusEntry>,
}

/// One aggregated sample in a chart series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Sample time, Unix seconds
    pub timestamp: i64,
    /// Minimum observed value in the bucket
    pub min: f64,
    /// Maximum observed value in the bucket
    pub max: f64,
    /// Mean value in the bucket
    pub avg: f64,
}

/// Paired down/up series (throughput in bits, packet loss in packets).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficSeries {
    /// Downstream samples
    pub down: Vec<ChartPoint>,
    /// Upstream samples
    pub up: Vec<ChartPoint>,
}

/// Single RTT series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RttSeries {
    /// RTT samples, milliseconds
    pub points: Vec<ChartPoint>,
}

/// RTT distribution; bucket `i` counts samples in `[10i, 10i+10)` ms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RttHistogramData {
    /// Sample counts per 10 ms bucket
    pub buckets: Vec<u32>,
}

/// One sample of a node's resource usage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerfPoint {
    /// Sample time, Unix seconds
    pub timestamp: i64,
    /// Mean CPU load, percent
    pub cpu: f64,
    /// Peak single-core CPU load, percent
    pub cpu_max: f64,
    /// RAM in use, percent
    pub ram: f64,
}

/// CPU/RAM performance series for one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodePerfSeries {
    /// Resource samples
    pub points: Vec<PerfPoint>,
}

/// A named traffic series, one stack band per child site/circuit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedTrafficSeries {
    /// Child site or circuit name
    pub name: String,
    /// The child's traffic
    pub series: TrafficSeries,
}

/// Stacked throughput of everything directly under one site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteStackData {
    /// One band per child
    pub bands: Vec<NamedTrafficSeries>,
}

/// One heat-map cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    /// Sample time, Unix seconds
    pub timestamp: i64,
    /// Mean RTT in the bucket, milliseconds
    pub rtt: f64,
}

/// One heat-map row (a child site).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatRow {
    /// Row label
    pub name: String,
    /// Cells, oldest first
    pub points: Vec<HeatPoint>,
}

/// RTT heat map rooted at the root or at one site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeatMapData {
    /// One row per child
    pub rows: Vec<HeatRow>,
}

/// One topology tree record; also the site-info detail shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeNodeRecord {
    /// Record identifier
    pub id: u64,
    /// Parent record identifier (0 for the root)
    pub parent: u64,
    /// Display name
    pub name: String,
    /// Record type ("site", "ap", "circuit", ...)
    pub site_type: String,
    /// Provisioned downstream limit, Mbps
    pub max_down: u64,
    /// Provisioned upstream limit, Mbps
    pub max_up: u64,
}

/// Topology tree rooted at the requested parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeData {
    /// Flattened records; parents precede children
    pub nodes: Vec<TreeNodeRecord>,
}

/// One ancestor in a parent chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParentEntry {
    /// Ancestor identifier
    pub id: u64,
    /// Ancestor display name
    pub name: String,
}

/// Ancestors of a site/circuit, nearest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParentChain {
    /// Nearest ancestor first, root last
    pub parents: Vec<ParentEntry>,
}

/// One search hit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Hit type ("site", "circuit", "device")
    pub kind: String,
    /// Hit identifier
    pub id: u64,
    /// Matched display name
    pub name: String,
}

/// Search hits, best match first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Matches, best first
    pub hits: Vec<SearchHit>,
}

/// One managed device attached to a circuit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Device identifier
    pub id: u64,
    /// Device display name
    pub name: String,
}

/// Circuit detail record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircuitInfoData {
    /// Circuit identifier
    pub id: u64,
    /// Circuit display name
    pub name: String,
    /// Devices on this circuit
    pub devices: Vec<DeviceRecord>,
}

/// Vendor device records for one device query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfoData {
    /// Matching devices
    pub devices: Vec<DeviceRecord>,
}

/// One signal/noise sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    /// Sample time, Unix seconds
    pub timestamp: i64,
    /// Signal strength, dBm
    pub signal: f64,
    /// Noise floor, dBm
    pub noise: f64,
}

/// Signal/noise series for one device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnrSeries {
    /// Signal samples
    pub points: Vec<SignalPoint>,
}

/// One capacity estimate sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapacityPoint {
    /// Sample time, Unix seconds
    pub timestamp: i64,
    /// Estimated downstream capacity, Mbps
    pub down_mbps: f64,
    /// Estimated upstream capacity, Mbps
    pub up_mbps: f64,
}

/// Capacity estimate series for one device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapacitySeries {
    /// Capacity samples
    pub points: Vec<CapacityPoint>,
}

// =============================================================================
// Response kinds
// =============================================================================

/// Field-less response discriminant - the router key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// Token accepted
    AuthOk,
    /// Token rejected
    AuthFail,
    /// Login succeeded
    LoginOk,
    /// Login rejected
    LoginFail,
    /// Shaper node status table
    NodeStatus,
    /// Packet-loss chart
    PacketChart,
    /// Throughput chart
    ThroughputChart,
    /// RTT chart
    RttChart,
    /// RTT histogram
    RttHistogram,
    /// Node performance chart
    NodePerfChart,
    /// Site stack series
    SiteStack,
    /// Root heat map
    RootHeat,
    /// Site heat map
    SiteHeat,
    /// Topology tree
    Tree,
    /// Site detail record
    SiteInfo,
    /// Site parent chain
    SiteParents,
    /// Circuit parent chain
    CircuitParents,
    /// Root parent chain
    RootParents,
    /// Search hits
    SearchResult,
    /// Circuit detail record
    CircuitInfo,
    /// Vendor device records
    ExtDeviceInfo,
    /// Signal/noise graph
    ExtSnrGraph,
    /// Capacity graph
    ExtCapacityGraph,
}

impl ResponseKind {
    /// The wire tag this kind decodes from.
    pub fn tag(&self) -> u16 {
        match self {
            ResponseKind::AuthOk => tags::RESP_AUTH_OK,
            ResponseKind::AuthFail => tags::RESP_AUTH_FAIL,
            ResponseKind::LoginOk => tags::RESP_LOGIN_OK,
            ResponseKind::LoginFail => tags::RESP_LOGIN_FAIL,
            ResponseKind::NodeStatus => tags::RESP_NODE_STATUS,
            ResponseKind::PacketChart => tags::RESP_PACKET_CHART,
            ResponseKind::ThroughputChart => tags::RESP_THROUGHPUT_CHART,
            ResponseKind::RttChart => tags::RESP_RTT_CHART,
            ResponseKind::RttHistogram => tags::RESP_RTT_HISTOGRAM,
            ResponseKind::NodePerfChart => tags::RESP_NODE_PERF_CHART,
            ResponseKind::SiteStack => tags::RESP_SITE_STACK,
            ResponseKind::RootHeat => tags::RESP_ROOT_HEAT,
            ResponseKind::SiteHeat => tags::RESP_SITE_HEAT,
            ResponseKind::Tree => tags::RESP_TREE,
            ResponseKind::SiteInfo => tags::RESP_SITE_INFO,
            ResponseKind::SiteParents => tags::RESP_SITE_PARENTS,
            ResponseKind::CircuitParents => tags::RESP_CIRCUIT_PARENTS,
            ResponseKind::RootParents => tags::RESP_ROOT_PARENTS,
            ResponseKind::SearchResult => tags::RESP_SEARCH_RESULT,
            ResponseKind::CircuitInfo => tags::RESP_CIRCUIT_INFO,
            ResponseKind::ExtDeviceInfo => tags::RESP_EXT_DEVICE_INFO,
            ResponseKind::ExtSnrGraph => tags::RESP_EXT_SNR_GRAPH,
            ResponseKind::ExtCapacityGraph => tags::RESP_EXT_CAPACITY_GRAPH,
        }
    }

    /// Convert from a wire tag.
    ///
    /// Returns `None` for unknown tags.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            tags::RESP_AUTH_OK => Some(ResponseKind::AuthOk),
            tags::RESP_AUTH_FAIL => Some(ResponseKind::AuthFail),
            tags::RESP_LOGIN_OK => Some(ResponseKind::LoginOk),
            tags::RESP_LOGIN_FAIL => Some(ResponseKind::LoginFail),
            tags::RESP_NODE_STATUS => Some(ResponseKind::NodeStatus),
            tags::RESP_PACKET_CHART => Some(ResponseKind::PacketChart),
            tags::RESP_THROUGHPUT_CHART => Some(ResponseKind::ThroughputChart),
            tags::RESP_RTT_CHART => Some(ResponseKind::RttChart),
            tags::RESP_RTT_HISTOGRAM => Some(ResponseKind::RttHistogram),
            tags::RESP_NODE_PERF_CHART => Some(ResponseKind::NodePerfChart),
            tags::RESP_SITE_STACK => Some(ResponseKind::SiteStack),
            tags::RESP_ROOT_HEAT => Some(ResponseKind::RootHeat),
            tags::RESP_SITE_HEAT => Some(ResponseKind::SiteHeat),
            tags::RESP_TREE => Some(ResponseKind::Tree),
            tags::RESP_SITE_INFO => Some(ResponseKind::SiteInfo),
            tags::RESP_SITE_PARENTS => Some(ResponseKind::SiteParents),
            tags::RESP_CIRCUIT_PARENTS => Some(ResponseKind::CircuitParents),
            tags::RESP_ROOT_PARENTS => Some(ResponseKind::RootParents),
            tags::RESP_SEARCH_RESULT => Some(ResponseKind::SearchResult),
            tags::RESP_CIRCUIT_INFO => Some(ResponseKind::CircuitInfo),
            tags::RESP_EXT_DEVICE_INFO => Some(ResponseKind::ExtDeviceInfo),
            tags::RESP_EXT_SNR_GRAPH => Some(ResponseKind::ExtSnrGraph),
            tags::RESP_EXT_CAPACITY_GRAPH => Some(ResponseKind::ExtCapacityGraph),
            _ => None,
        }
    }

    /// Stable display name, used as the consumer-registry key at the JS
    /// boundary.
    pub fn name(&self) -> &'static str {
        match self {
            ResponseKind::AuthOk => "AuthOk",
            ResponseKind::AuthFail => "AuthFail",
            ResponseKind::LoginOk => "LoginOk",
            ResponseKind::LoginFail => "LoginFail",
            ResponseKind::NodeStatus => "NodeStatus",
            ResponseKind::PacketChart => "PacketChart",
            ResponseKind::ThroughputChart => "ThroughputChart",
            ResponseKind::RttChart => "RttChart",
            ResponseKind::RttHistogram => "RttHistogram",
            ResponseKind::NodePerfChart => "NodePerfChart",
            ResponseKind::SiteStack => "SiteStack",
            ResponseKind::RootHeat => "RootHeat",
            ResponseKind::SiteHeat => "SiteHeat",
            ResponseKind::Tree => "Tree",
            ResponseKind::SiteInfo => "SiteInfo",
            ResponseKind::SiteParents => "SiteParents",
            ResponseKind::CircuitParents => "CircuitParents",
            ResponseKind::RootParents => "RootParents",
            ResponseKind::SearchResult => "SearchResult",
            ResponseKind::CircuitInfo => "CircuitInfo",
            ResponseKind::ExtDeviceInfo => "ExtDeviceInfo",
            ResponseKind::ExtSnrGraph => "ExtSnrGraph",
            ResponseKind::ExtCapacityGraph => "ExtCapacityGraph",
        }
    }

    /// Convert from a display name.
    ///
    /// Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "AuthOk" => Some(ResponseKind::AuthOk),
            "AuthFail" => Some(ResponseKind::AuthFail),
            "LoginOk" => Some(ResponseKind::LoginOk),
            "LoginFail" => Some(ResponseKind::LoginFail),
            "NodeStatus" => Some(ResponseKind::NodeStatus),
            "PacketChart" => Some(ResponseKind::PacketChart),
            "ThroughputChart" => Some(ResponseKind::ThroughputChart),
            "RttChart" => Some(ResponseKind::RttChart),
            "RttHistogram" => Some(ResponseKind::RttHistogram),
            "NodePerfChart" => Some(ResponseKind::NodePerfChart),
            "SiteStack" => Some(ResponseKind::SiteStack),
            "RootHeat" => Some(ResponseKind::RootHeat),
            "SiteHeat" => Some(ResponseKind::SiteHeat),
            "Tree" => Some(ResponseKind::Tree),
            "SiteInfo" => Some(ResponseKind::SiteInfo),
            "SiteParents" => Some(ResponseKind::SiteParents),
            "CircuitParents" => Some(ResponseKind::CircuitParents),
            "RootParents" => Some(ResponseKind::RootParents),
            "SearchResult" => Some(ResponseKind::SearchResult),
            "CircuitInfo" => Some(ResponseKind::CircuitInfo),
            "ExtDeviceInfo" => Some(ResponseKind::ExtDeviceInfo),
            "ExtSnrGraph" => Some(ResponseKind::ExtSnrGraph),
            "ExtCapacityGraph" => Some(ResponseKind::ExtCapacityGraph),
            _ => None,
        }
    }
}

// =============================================================================
// Response enum
// =============================================================================

/// Inbound response variants, paired with their typed payloads.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// Token accepted
    AuthOk(AuthOk),
    /// Token rejected
    AuthFail,
    /// Login succeeded
    LoginOk(LoginOk),
    /// Login rejected
    LoginFail,
    /// Shaper node status table
    NodeStatus(NodeStatusData),
    /// Packet-loss chart
    PacketChart(TrafficSeries),
    /// Throughput chart
    ThroughputChart(TrafficSeries),
    /// RTT chart
    RttChart(RttSeries),
    /// RTT histogram
    RttHistogram(RttHistogramData),
    /// Node performance chart
    NodePerfChart(NodePerfSeries),
    /// Site stack series
    SiteStack(SiteStackData),
    /// Root heat map
    RootHeat(HeatMapData),
    /// Site heat map
    SiteHeat(HeatMapData),
    /// Topology tree
    Tree(TreeData),
    /// Site detail record
    SiteInfo(TreeNodeRecord),
    /// Site parent chain
    SiteParents(ParentChain),
    /// Circuit parent chain
    CircuitParents(ParentChain),
    /// Root parent chain
    RootParents(ParentChain),
    /// Search hits
    SearchResult(SearchResults),
    /// Circuit detail record
    CircuitInfo(CircuitInfoData),
    /// Vendor device records
    ExtDeviceInfo(DeviceInfoData),
    /// Signal/noise graph
    ExtSnrGraph(SnrSeries),
    /// Capacity graph
    ExtCapacityGraph(CapacitySeries),
}

impl Response {
    /// The routing key for this response.
    pub fn kind(&self) -> ResponseKind {
        match self {
            Response::AuthOk(_) => ResponseKind::AuthOk,
            Response::AuthFail => ResponseKind::AuthFail,
            Response::LoginOk(_) => ResponseKind::LoginOk,
            Response::LoginFail => ResponseKind::LoginFail,
            Response::NodeStatus(_) => ResponseKind::NodeStatus,
            Response::PacketChart(_) => ResponseKind::PacketChart,
            Response::ThroughputChart(_) => ResponseKind::ThroughputChart,
            Response::RttChart(_) => ResponseKind::RttChart,
            Response::RttHistogram(_) => ResponseKind::RttHistogram,
            Response::NodePerfChart(_) => ResponseKind::NodePerfChart,
            Response::SiteStack(_) => ResponseKind::SiteStack,
            Response::RootHeat(_) => ResponseKind::RootHeat,
            Response::SiteHeat(_) => ResponseKind::SiteHeat,
            Response::Tree(_) => ResponseKind::Tree,
            Response::SiteInfo(_) => ResponseKind::SiteInfo,
            Response::SiteParents(_) => ResponseKind::SiteParents,
            Response::CircuitParents(_) => ResponseKind::CircuitParents,
            Response::RootParents(_) => ResponseKind::RootParents,
            Response::SearchResult(_) => ResponseKind::SearchResult,
            Response::CircuitInfo(_) => ResponseKind::CircuitInfo,
            Response::ExtDeviceInfo(_) => ResponseKind::ExtDeviceInfo,
            Response::ExtSnrGraph(_) => ResponseKind::ExtSnrGraph,
            Response::ExtCapacityGraph(_) => ResponseKind::ExtCapacityGraph,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn test_kind_tag_round_trip() {
        let kinds = [
            ResponseKind::AuthOk,
            ResponseKind::LoginFail,
            ResponseKind::RttChart,
            ResponseKind::SiteHeat,
            ResponseKind::ExtCapacityGraph,
        ];
        for kind in kinds {
            assert_eq!(ResponseKind::from_tag(kind.tag()), Some(kind));
            assert_eq!(ResponseKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_tag_and_name_rejected() {
        assert_eq!(ResponseKind::from_tag(0xBEEF), None);
        assert_eq!(ResponseKind::from_name("NoSuchKind"), None);
    }

    #[test]
    fn test_response_kind_pairing() {
        let resp = Response::RttChart(RttSeries { points: vec![] });
        assert_eq!(resp.kind(), ResponseKind::RttChart);

        let resp = Response::LoginOk(LoginOk {
            token: "t".to_string(),
            name: "alice".to_string(),
        });
        assert_eq!(resp.kind(), ResponseKind::LoginOk);
    }
}
