//! Binary frame codec
//!
//! Encoding is pure and total for well-formed values. Decoding is strict:
//! an unknown tag, a truncated payload, trailing bytes, or a response body
//! that does not match its kind's payload type all fail without partially
//! constructed results.

use alloc::vec::Vec;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::command::{CircuitId, Command, DateRange, DeviceId, NodeId, SiteId};
use crate::response::{Response, ResponseKind};
use crate::tags;

/// Codec failures. All of them mean the frame is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtoError {
    /// The discriminant tag is not in either allocation table
    UnknownTag(u16),
    /// The payload ended before the variant's layout was satisfied
    Truncated,
    /// Bytes remained after the variant's layout was consumed
    TrailingBytes,
    /// A length-prefixed body was present but did not parse
    BadPayload,
}

impl ProtoError {
    /// Human-readable error name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtoError::UnknownTag(_) => "unknown frame tag",
            ProtoError::Truncated => "truncated frame",
            ProtoError::TrailingBytes => "trailing bytes after frame",
            ProtoError::BadPayload => "malformed frame payload",
        }
    }
}

impl core::fmt::Display for ProtoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtoError::UnknownTag(tag) => write!(f, "unknown frame tag 0x{tag:04X}"),
            other => f.write_str(other.as_str()),
        }
    }
}

// =============================================================================
// Frame writer / reader
// =============================================================================

/// Append-only frame builder. All integers little-endian.
struct FrameWriter {
    buf: Vec<u8>,
}

impl FrameWriter {
    fn with_tag(tag: u16) -> Self {
        let mut buf = Vec::with_capacity(16);
        buf.extend_from_slice(&tag.to_le_bytes());
        Self { buf }
    }

    fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Length-prefixed byte blob: `[len: u32][bytes]`.
    fn put_bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(&(v.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(v);
    }

    fn put_str(&mut self, v: &str) {
        self.put_bytes(v.as_bytes());
    }

    fn put_range(&mut self, range: DateRange) {
        self.put_i64(range.start);
        self.put_i64(range.end);
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Strict cursor over a received frame.
struct FrameReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtoError> {
        let end = self.pos.checked_add(n).ok_or(ProtoError::Truncated)?;
        if end > self.data.len() {
            return Err(ProtoError::Truncated);
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_u8(&mut self) -> Result<u8, ProtoError> {
        Ok(self.take(1)?[0])
    }

    fn take_u16(&mut self) -> Result<u16, ProtoError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn take_u32(&mut self) -> Result<u32, ProtoError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn take_u64(&mut self) -> Result<u64, ProtoError> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(u64::from_le_bytes(raw))
    }

    fn take_i64(&mut self) -> Result<i64, ProtoError> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(i64::from_le_bytes(raw))
    }

    fn take_bytes(&mut self) -> Result<&'a [u8], ProtoError> {
        let len = self.take_u32()? as usize;
        self.take(len)
    }

    fn take_str(&mut self) -> Result<&'a str, ProtoError> {
        core::str::from_utf8(self.take_bytes()?).map_err(|_| ProtoError::BadPayload)
    }

    fn take_range(&mut self) -> Result<DateRange, ProtoError> {
        let start = self.take_i64()?;
        let end = self.take_i64()?;
        Ok(DateRange { start, end })
    }

    /// Every decode must consume the frame exactly.
    fn expect_end(&self) -> Result<(), ProtoError> {
        if self.pos == self.data.len() {
            Ok(())
        } else {
            Err(ProtoError::TrailingBytes)
        }
    }
}

// =============================================================================
// Command codec
// =============================================================================

/// Encode a command into a self-describing frame.
pub fn encode_command(cmd: &Command) -> Vec<u8> {
    let mut w = FrameWriter::with_tag(cmd.tag());
    match cmd {
        Command::SetToken { token } => w.put_bytes(token),
        Command::Login { username, password } => {
            w.put_str(username);
            w.put_str(password);
        }
        Command::NodeStatus | Command::RootParents => {}
        Command::PacketChart { range }
        | Command::ThroughputChart { range }
        | Command::RttChart { range }
        | Command::RttHistogram { range }
        | Command::RootHeat { range } => w.put_range(*range),
        Command::PacketChartForNode { range, node }
        | Command::ThroughputChartForNode { range, node }
        | Command::RttChartForNode { range, node }
        | Command::NodePerfChart { range, node } => {
            w.put_range(*range);
            w.put_u64(node.0);
        }
        Command::ThroughputChartForSite { range, site }
        | Command::RttChartForSite { range, site }
        | Command::SiteStack { range, site }
        | Command::SiteHeat { range, site } => {
            w.put_range(*range);
            w.put_u64(site.0);
        }
        Command::ThroughputChartForCircuit { range, circuit }
        | Command::RttChartForCircuit { range, circuit } => {
            w.put_range(*range);
            w.put_u64(circuit.0);
        }
        Command::Tree { parent } => match parent {
            Some(site) => {
                w.put_u8(1);
                w.put_u64(site.0);
            }
            None => w.put_u8(0),
        },
        Command::SiteInfo { site } | Command::SiteParents { site } => w.put_u64(site.0),
        Command::CircuitParents { circuit } | Command::CircuitInfo { circuit } => {
            w.put_u64(circuit.0)
        }
        Command::Search { term } => w.put_str(term),
        Command::ExtDeviceInfo { device } => w.put_u64(device.0),
        Command::ExtSnrGraph { range, device } | Command::ExtCapacityGraph { range, device } => {
            w.put_range(*range);
            w.put_u64(device.0);
        }
    }
    w.finish()
}

/// Decode a command frame. Exists for tests and for peers that reuse this
/// crate server-side.
pub fn decode_command(frame: &[u8]) -> Result<Command, ProtoError> {
    let mut r = FrameReader::new(frame);
    let tag = r.take_u16()?;
    let cmd = match tag {
        tags::CMD_SET_TOKEN => Command::SetToken {
            token: r.take_bytes()?.to_vec(),
        },
        tags::CMD_LOGIN => Command::Login {
            username: r.take_str()?.into(),
            password: r.take_str()?.into(),
        },
        tags::CMD_NODE_STATUS => Command::NodeStatus,
        tags::CMD_PACKET_CHART => Command::PacketChart {
            range: r.take_range()?,
        },
        tags::CMD_PACKET_CHART_FOR_NODE => Command::PacketChartForNode {
            range: r.take_range()?,
            node: NodeId(r.take_u64()?),
        },
        tags::CMD_THROUGHPUT_CHART => Command::ThroughputChart {
            range: r.take_range()?,
        },
        tags::CMD_THROUGHPUT_CHART_FOR_SITE => Command::ThroughputChartForSite {
            range: r.take_range()?,
            site: SiteId(r.take_u64()?),
        },
        tags::CMD_THROUGHPUT_CHART_FOR_NODE => Command::ThroughputChartForNode {
            range: r.take_range()?,
            node: NodeId(r.take_u64()?),
        },
        tags::CMD_THROUGHPUT_CHART_FOR_CIRCUIT => Command::ThroughputChartForCircuit {
            range: r.take_range()?,
            circuit: CircuitId(r.take_u64()?),
        },
        tags::CMD_RTT_CHART => Command::RttChart {
            range: r.take_range()?,
        },
        tags::CMD_RTT_HISTOGRAM => Command::RttHistogram {
            range: r.take_range()?,
        },
        tags::CMD_RTT_CHART_FOR_SITE => Command::RttChartForSite {
            range: r.take_range()?,
            site: SiteId(r.take_u64()?),
        },
        tags::CMD_RTT_CHART_FOR_NODE => Command::RttChartForNode {
            range: r.take_range()?,
            node: NodeId(r.take_u64()?),
        },
        tags::CMD_RTT_CHART_FOR_CIRCUIT => Command::RttChartForCircuit {
            range: r.take_range()?,
            circuit: CircuitId(r.take_u64()?),
        },
        tags::CMD_NODE_PERF_CHART => Command::NodePerfChart {
            range: r.take_range()?,
            node: NodeId(r.take_u64()?),
        },
        tags::CMD_SITE_STACK => Command::SiteStack {
            range: r.take_range()?,
            site: SiteId(r.take_u64()?),
        },
        tags::CMD_ROOT_HEAT => Command::RootHeat {
            range: r.take_range()?,
        },
        tags::CMD_SITE_HEAT => Command::SiteHeat {
            range: r.take_range()?,
            site: SiteId(r.take_u64()?),
        },
        tags::CMD_TREE => {
            let parent = match r.take_u8()? {
                0 => None,
                1 => Some(SiteId(r.take_u64()?)),
                _ => return Err(ProtoError::BadPayload),
            };
            Command::Tree { parent }
        }
        tags::CMD_SITE_INFO => Command::SiteInfo {
            site: SiteId(r.take_u64()?),
        },
        tags::CMD_SITE_PARENTS => Command::SiteParents {
            site: SiteId(r.take_u64()?),
        },
        tags::CMD_CIRCUIT_PARENTS => Command::CircuitParents {
            circuit: CircuitId(r.take_u64()?),
        },
        tags::CMD_ROOT_PARENTS => Command::RootParents,
        tags::CMD_SEARCH => Command::Search {
            term: r.take_str()?.into(),
        },
        tags::CMD_CIRCUIT_INFO => Command::CircuitInfo {
            circuit: CircuitId(r.take_u64()?),
        },
        tags::CMD_EXT_DEVICE_INFO => Command::ExtDeviceInfo {
            device: DeviceId(r.take_u64()?),
        },
        tags::CMD_EXT_SNR_GRAPH => Command::ExtSnrGraph {
            range: r.take_range()?,
            device: DeviceId(r.take_u64()?),
        },
        tags::CMD_EXT_CAPACITY_GRAPH => Command::ExtCapacityGraph {
            range: r.take_range()?,
            device: DeviceId(r.take_u64()?),
        },
        other => return Err(ProtoError::UnknownTag(other)),
    };
    r.expect_end()?;
    Ok(cmd)
}

// =============================================================================
// Response codec
// =============================================================================

fn put_body<T: Serialize>(w: &mut FrameWriter, body: &T) {
    // Serializing these plain data structs cannot fail; an OOM aborts the
    // instance before serde_json reports anything.
    let json = serde_json::to_vec(body);
    debug_assert!(json.is_ok(), "response payload failed to serialize");
    w.put_bytes(&json.unwrap_or_default());
}

fn take_body<T: DeserializeOwned>(r: &mut FrameReader) -> Result<T, ProtoError> {
    let raw = r.take_bytes()?;
    serde_json::from_slice(raw).map_err(|_| ProtoError::BadPayload)
}

/// Encode a response into a frame: `[tag][len: u32][JSON body]`.
///
/// Kinds without a payload carry a zero-length body.
pub fn encode_response(resp: &Response) -> Vec<u8> {
    let mut w = FrameWriter::with_tag(resp.kind().tag());
    match resp {
        Response::AuthFail | Response::LoginFail => w.put_bytes(&[]),
        Response::AuthOk(body) => put_body(&mut w, body),
        Response::LoginOk(body) => put_body(&mut w, body),
        Response::NodeStatus(body) => put_body(&mut w, body),
        Response::PacketChart(body) | Response::ThroughputChart(body) => put_body(&mut w, body),
        Response::RttChart(body) => put_body(&mut w, body),
        Response::RttHistogram(body) => put_body(&mut w, body),
        Response::NodePerfChart(body) => put_body(&mut w, body),
        Response::SiteStack(body) => put_body(&mut w, body),
        Response::RootHeat(body) | Response::SiteHeat(body) => put_body(&mut w, body),
        Response::Tree(body) => put_body(&mut w, body),
        Response::SiteInfo(body) => put_body(&mut w, body),
        Response::SiteParents(body)
        | Response::CircuitParents(body)
        | Response::RootParents(body) => put_body(&mut w, body),
        Response::SearchResult(body) => put_body(&mut w, body),
        Response::CircuitInfo(body) => put_body(&mut w, body),
        Response::ExtDeviceInfo(body) => put_body(&mut w, body),
        Response::ExtSnrGraph(body) => put_body(&mut w, body),
        Response::ExtCapacityGraph(body) => put_body(&mut w, body),
    }
    w.finish()
}

/// Decode an inbound frame into a typed response.
///
/// Fails with an error (never a partial value) on unknown tags, truncated
/// payloads, or a body that does not match the kind's payload type.
pub fn decode_response(frame: &[u8]) -> Result<Response, ProtoError> {
    let mut r = FrameReader::new(frame);
    let tag = r.take_u16()?;
    let kind = ResponseKind::from_tag(tag).ok_or(ProtoError::UnknownTag(tag))?;
    let resp = match kind {
        ResponseKind::AuthOk => Response::AuthOk(take_body(&mut r)?),
        ResponseKind::AuthFail => {
            let _ = r.take_bytes()?;
            Response::AuthFail
        }
        ResponseKind::LoginOk => Response::LoginOk(take_body(&mut r)?),
        ResponseKind::LoginFail => {
            let _ = r.take_bytes()?;
            Response::LoginFail
        }
        ResponseKind::NodeStatus => Response::NodeStatus(take_body(&mut r)?),
        ResponseKind::PacketChart => Response::PacketChart(take_body(&mut r)?),
        ResponseKind::ThroughputChart => Response::ThroughputChart(take_body(&mut r)?),
        ResponseKind::RttChart => Response::RttChart(take_body(&mut r)?),
        ResponseKind::RttHistogram => Response::RttHistogram(take_body(&mut r)?),
        ResponseKind::NodePerfChart => Response::NodePerfChart(take_body(&mut r)?),
        ResponseKind::SiteStack => Response::SiteStack(take_body(&mut r)?),
        ResponseKind::RootHeat => Response::RootHeat(take_body(&mut r)?),
        ResponseKind::SiteHeat => Response::SiteHeat(take_body(&mut r)?),
        ResponseKind::Tree => Response::Tree(take_body(&mut r)?),
        ResponseKind::SiteInfo => Response::SiteInfo(take_body(&mut r)?),
        ResponseKind::SiteParents => Response::SiteParents(take_body(&mut r)?),
        ResponseKind::CircuitParents => Response::CircuitParents(take_body(&mut r)?),
        ResponseKind::RootParents => Response::RootParents(take_body(&mut r)?),
        ResponseKind::SearchResult => Response::SearchResult(take_body(&mut r)?),
        ResponseKind::CircuitInfo => Response::CircuitInfo(take_body(&mut r)?),
        ResponseKind::ExtDeviceInfo => Response::ExtDeviceInfo(take_body(&mut r)?),
        ResponseKind::ExtSnrGraph => Response::ExtSnrGraph(take_body(&mut r)?),
        ResponseKind::ExtCapacityGraph => Response::ExtCapacityGraph(take_body(&mut r)?),
    };
    r.expect_end()?;
    Ok(resp)
}
