//! Frame tag constants
//!
//! One `u16` tag per frame variant. Commands and responses live in disjoint
//! ranges so a stray loopback can never decode as the wrong direction.
//!
//! Scoped chart commands (per site / node / circuit) have distinct command
//! tags but share their unscoped response tag: the backend answers an
//! `RTT_CHART_FOR_CIRCUIT` command with an `RESP_RTT_CHART` frame. Routing
//! is therefore by response kind only - see `statpipe-core`.

// === Commands: auth (0x0001 - 0x000F) ===

/// Present a session token for this connection
pub const CMD_SET_TOKEN: u16 = 0x0001;
/// Log in with a credential pair
pub const CMD_LOGIN: u16 = 0x0002;

// === Commands: charts (0x0010 - 0x001F) ===

/// Shaper node status (no parameters)
pub const CMD_NODE_STATUS: u16 = 0x0010;
/// Packet-loss chart for the whole network
pub const CMD_PACKET_CHART: u16 = 0x0011;
/// Packet-loss chart scoped to one node
pub const CMD_PACKET_CHART_FOR_NODE: u16 = 0x0012;
/// Throughput chart for the whole network
pub const CMD_THROUGHPUT_CHART: u16 = 0x0013;
/// Throughput chart scoped to one site
pub const CMD_THROUGHPUT_CHART_FOR_SITE: u16 = 0x0014;
/// Throughput chart scoped to one node
pub const CMD_THROUGHPUT_CHART_FOR_NODE: u16 = 0x0015;
/// Throughput chart scoped to one circuit
pub const CMD_THROUGHPUT_CHART_FOR_CIRCUIT: u16 = 0x0016;
/// Round-trip-time chart for the whole network
pub const CMD_RTT_CHART: u16 = 0x0017;
/// Round-trip-time histogram for the whole network
pub const CMD_RTT_HISTOGRAM: u16 = 0x0018;
/// RTT chart scoped to one site
pub const CMD_RTT_CHART_FOR_SITE: u16 = 0x0019;
/// RTT chart scoped to one node
pub const CMD_RTT_CHART_FOR_NODE: u16 = 0x001A;
/// RTT chart scoped to one circuit
pub const CMD_RTT_CHART_FOR_CIRCUIT: u16 = 0x001B;
/// CPU/RAM performance chart for one node
pub const CMD_NODE_PERF_CHART: u16 = 0x001C;

// === Commands: topology (0x0020 - 0x002F) ===

/// Stacked per-child throughput under one site
pub const CMD_SITE_STACK: u16 = 0x0020;
/// RTT heat map rooted at the network root
pub const CMD_ROOT_HEAT: u16 = 0x0021;
/// RTT heat map rooted at one site
pub const CMD_SITE_HEAT: u16 = 0x0022;
/// Topology tree, optionally rooted at a site
pub const CMD_TREE: u16 = 0x0023;
/// Detail record for one site
pub const CMD_SITE_INFO: u16 = 0x0024;
/// Parent chain of one site
pub const CMD_SITE_PARENTS: u16 = 0x0025;
/// Parent chain of one circuit
pub const CMD_CIRCUIT_PARENTS: u16 = 0x0026;
/// Parent chain of the network root
pub const CMD_ROOT_PARENTS: u16 = 0x0027;
/// Free-text search over sites, circuits and devices
pub const CMD_SEARCH: u16 = 0x0028;
/// Detail record for one circuit
pub const CMD_CIRCUIT_INFO: u16 = 0x0029;

// === Commands: extended device telemetry (0x0030 - 0x003F) ===

/// Vendor device records for a circuit's hardware
pub const CMD_EXT_DEVICE_INFO: u16 = 0x0030;
/// Signal/noise graph for one device
pub const CMD_EXT_SNR_GRAPH: u16 = 0x0031;
/// Capacity estimate graph for one device
pub const CMD_EXT_CAPACITY_GRAPH: u16 = 0x0032;

// === Responses (0x0101 - 0x01FF) ===

/// Token accepted
pub const RESP_AUTH_OK: u16 = 0x0101;
/// Token rejected
pub const RESP_AUTH_FAIL: u16 = 0x0102;
/// Login succeeded, body carries the session token
pub const RESP_LOGIN_OK: u16 = 0x0103;
/// Login rejected
pub const RESP_LOGIN_FAIL: u16 = 0x0104;
/// Shaper node status table
pub const RESP_NODE_STATUS: u16 = 0x0110;
/// Packet-loss chart (whole network or scoped)
pub const RESP_PACKET_CHART: u16 = 0x0111;
/// Throughput chart (whole network or scoped)
pub const RESP_THROUGHPUT_CHART: u16 = 0x0113;
/// RTT chart (whole network or scoped)
pub const RESP_RTT_CHART: u16 = 0x0117;
/// RTT histogram
pub const RESP_RTT_HISTOGRAM: u16 = 0x0118;
/// Node performance chart
pub const RESP_NODE_PERF_CHART: u16 = 0x011C;
/// Site stack series
pub const RESP_SITE_STACK: u16 = 0x0120;
/// Root heat map
pub const RESP_ROOT_HEAT: u16 = 0x0121;
/// Site heat map
pub const RESP_SITE_HEAT: u16 = 0x0122;
/// Topology tree
pub const RESP_TREE: u16 = 0x0123;
/// Site detail record
pub const RESP_SITE_INFO: u16 = 0x0124;
/// Site parent chain
pub const RESP_SITE_PARENTS: u16 = 0x0125;
/// Circuit parent chain
pub const RESP_CIRCUIT_PARENTS: u16 = 0x0126;
/// Root parent chain
pub const RESP_ROOT_PARENTS: u16 = 0x0127;
/// Search hits
pub const RESP_SEARCH_RESULT: u16 = 0x0128;
/// Circuit detail record
pub const RESP_CIRCUIT_INFO: u16 = 0x0129;
/// Vendor device records
pub const RESP_EXT_DEVICE_INFO: u16 = 0x0130;
/// Signal/noise graph
pub const RESP_EXT_SNR_GRAPH: u16 = 0x0131;
/// Capacity graph
pub const RESP_EXT_CAPACITY_GRAPH: u16 = 0x0132;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_tags_are_unique() {
        let all = vec![
            CMD_SET_TOKEN,
            CMD_LOGIN,
            CMD_NODE_STATUS,
            CMD_PACKET_CHART,
            CMD_PACKET_CHART_FOR_NODE,
            CMD_THROUGHPUT_CHART,
            CMD_THROUGHPUT_CHART_FOR_SITE,
            CMD_THROUGHPUT_CHART_FOR_NODE,
            CMD_THROUGHPUT_CHART_FOR_CIRCUIT,
            CMD_RTT_CHART,
            CMD_RTT_HISTOGRAM,
            CMD_RTT_CHART_FOR_SITE,
            CMD_RTT_CHART_FOR_NODE,
            CMD_RTT_CHART_FOR_CIRCUIT,
            CMD_NODE_PERF_CHART,
            CMD_SITE_STACK,
            CMD_ROOT_HEAT,
            CMD_SITE_HEAT,
            CMD_TREE,
            CMD_SITE_INFO,
            CMD_SITE_PARENTS,
            CMD_CIRCUIT_PARENTS,
            CMD_ROOT_PARENTS,
            CMD_SEARCH,
            CMD_CIRCUIT_INFO,
            CMD_EXT_DEVICE_INFO,
            CMD_EXT_SNR_GRAPH,
            CMD_EXT_CAPACITY_GRAPH,
            RESP_AUTH_OK,
            RESP_AUTH_FAIL,
            RESP_LOGIN_OK,
            RESP_LOGIN_FAIL,
            RESP_NODE_STATUS,
            RESP_PACKET_CHART,
            RESP_THROUGHPUT_CHART,
            RESP_RTT_CHART,
            RESP_RTT_HISTOGRAM,
            RESP_NODE_PERF_CHART,
            RESP_SITE_STACK,
            RESP_ROOT_HEAT,
            RESP_SITE_HEAT,
            RESP_TREE,
            RESP_SITE_INFO,
            RESP_SITE_PARENTS,
            RESP_CIRCUIT_PARENTS,
            RESP_ROOT_PARENTS,
            RESP_SEARCH_RESULT,
            RESP_CIRCUIT_INFO,
            RESP_EXT_DEVICE_INFO,
            RESP_EXT_SNR_GRAPH,
            RESP_EXT_CAPACITY_GRAPH,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b, "duplicate frame tag 0x{a:04X}");
            }
        }
    }

    #[test]
    fn test_ranges_are_disjoint() {
        assert!(CMD_EXT_CAPACITY_GRAPH < 0x0100);
        assert!(RESP_AUTH_OK > 0x0100);
    }
}
