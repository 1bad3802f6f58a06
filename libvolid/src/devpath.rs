//! Packed device-path values.
//!
//! A device path is a chain of variable-length nodes, each with a one-byte
//! type, one-byte subtype and a little-endian total length that includes
//! the four header bytes. The chain ends with an end node (type 0x7f).
//! Paths are kept in their packed wire form; the scanner only ever walks
//! nodes, cuts whole-disk prefixes and hands paths back to the firmware.

use core::fmt;

use zerocopy::byteorder::{LittleEndian, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, Unaligned};

pub const HARDWARE_DEVICE_PATH: u8 = 0x01;
pub const ACPI_DEVICE_PATH: u8 = 0x02;
pub const MESSAGING_DEVICE_PATH: u8 = 0x03;
pub const MEDIA_DEVICE_PATH: u8 = 0x04;
pub const BBS_DEVICE_PATH: u8 = 0x05;
pub const END_DEVICE_PATH: u8 = 0x7f;

pub const END_ENTIRE_SUBTYPE: u8 = 0xff;

pub const MSG_FIBRECHANNEL_DP: u8 = 0x03;
pub const MSG_1394_DP: u8 = 0x04;
pub const MSG_USB_DP: u8 = 0x05;
pub const MSG_USB_CLASS_DP: u8 = 0x0f;

pub const MEDIA_HARDDRIVE_DP: u8 = 0x01;
pub const MEDIA_CDROM_DP: u8 = 0x02;
pub const MEDIA_VENDOR_DP: u8 = 0x03;
pub const MEDIA_FILEPATH_DP: u8 = 0x04;

pub const SIGNATURE_TYPE_MBR: u8 = 0x01;
pub const SIGNATURE_TYPE_GUID: u8 = 0x02;

const NODE_HEADER_LEN: usize = 4;
const END_NODE: [u8; 4] = [END_DEVICE_PATH, END_ENTIRE_SUBTYPE, 0x04, 0x00];

/// Payload of a media/HARDDRIVE node.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Unaligned, Immutable)]
pub struct HardDriveNode {
    pub partition_number: U32<LittleEndian>,
    pub partition_start: U64<LittleEndian>,
    pub partition_size: U64<LittleEndian>,
    pub signature: [u8; 16],
    pub mbr_type: u8,
    pub signature_type: u8,
}

/// An owned, packed device path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePath {
    bytes: Vec<u8>,
}

impl DevicePath {
    pub fn from_bytes(bytes: Vec<u8>) -> DevicePath {
        DevicePath { bytes }
    }

    /// A path consisting of only the end node.
    pub fn end() -> DevicePath {
        DevicePath {
            bytes: END_NODE.to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes of every node before the terminator.
    pub fn body(&self) -> &[u8] {
        let mut end = 0;
        for node in self.nodes() {
            end = node.end_offset;
        }
        &self.bytes[..end]
    }

    pub fn is_empty(&self) -> bool {
        self.nodes().next().is_none()
    }

    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            bytes: &self.bytes,
            pos: 0,
        }
    }

    /// Copy of this path truncated at `end_offset`, terminated with an end
    /// node. Used to synthesize the whole-disk path from a partition path.
    pub fn prefix_through(&self, end_offset: usize) -> DevicePath {
        let cut = end_offset.min(self.bytes.len());
        let mut bytes = self.bytes[..cut].to_vec();
        bytes.extend_from_slice(&END_NODE);
        DevicePath { bytes }
    }

    /// Append one node, keeping the terminator last.
    pub fn append_node(&mut self, node_type: u8, sub_type: u8, data: &[u8]) {
        let mut bytes = self.body().to_vec();
        let length = (NODE_HEADER_LEN + data.len()) as u16;
        bytes.push(node_type);
        bytes.push(sub_type);
        bytes.extend_from_slice(&length.to_le_bytes());
        bytes.extend_from_slice(data);
        bytes.extend_from_slice(&END_NODE);
        self.bytes = bytes;
    }
}

/// One node of a device path, borrowed from its packed form.
#[derive(Clone, Copy)]
pub struct DevicePathNode<'a> {
    pub node_type: u8,
    pub sub_type: u8,
    pub data: &'a [u8],
    /// Offset just past this node within the owning path.
    pub end_offset: usize,
}

impl<'a> DevicePathNode<'a> {
    /// Interpret this node's payload as a HARDDRIVE node.
    pub fn hard_drive(&self) -> Option<HardDriveNode> {
        HardDriveNode::read_from_prefix(self.data)
            .ok()
            .map(|(node, _)| node)
    }
}

impl fmt::Debug for DevicePathNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevicePathNode")
            .field("node_type", &self.node_type)
            .field("sub_type", &self.sub_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Iterator over the non-end nodes of a path. Stops at the end node, a
/// truncated node, or the end of the buffer.
pub struct Nodes<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = DevicePathNode<'a>;

    fn next(&mut self) -> Option<DevicePathNode<'a>> {
        if self.pos + NODE_HEADER_LEN > self.bytes.len() {
            return None;
        }
        let node_type = self.bytes[self.pos];
        if node_type == END_DEVICE_PATH {
            return None;
        }
        let sub_type = self.bytes[self.pos + 1];
        let length = u16::from_le_bytes([self.bytes[self.pos + 2], self.bytes[self.pos + 3]])
            as usize;
        let length = length.max(NODE_HEADER_LEN);
        if self.pos + length > self.bytes.len() {
            return None;
        }
        let node = DevicePathNode {
            node_type,
            sub_type,
            data: &self.bytes[self.pos + NODE_HEADER_LEN..self.pos + length],
            end_offset: self.pos + length,
        };
        self.pos += length;
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> DevicePath {
        let mut path = DevicePath::end();
        path.append_node(HARDWARE_DEVICE_PATH, 0x01, &[0x00, 0x00]);
        path.append_node(MESSAGING_DEVICE_PATH, 0x12, &[0x00; 6]);
        path.append_node(MEDIA_DEVICE_PATH, MEDIA_HARDDRIVE_DP, &[0x00; 38]);
        path
    }

    #[test]
    fn iterates_nodes_in_order() {
        let path = sample_path();
        let kinds: Vec<(u8, u8)> = path.nodes().map(|n| (n.node_type, n.sub_type)).collect();
        assert_eq!(
            kinds,
            vec![
                (HARDWARE_DEVICE_PATH, 0x01),
                (MESSAGING_DEVICE_PATH, 0x12),
                (MEDIA_DEVICE_PATH, MEDIA_HARDDRIVE_DP),
            ]
        );
    }

    #[test]
    fn prefix_through_keeps_leading_nodes() {
        let path = sample_path();
        let messaging = path
            .nodes()
            .find(|n| n.node_type == MESSAGING_DEVICE_PATH)
            .unwrap();
        let prefix = path.prefix_through(messaging.end_offset);
        let kinds: Vec<u8> = prefix.nodes().map(|n| n.node_type).collect();
        assert_eq!(kinds, vec![HARDWARE_DEVICE_PATH, MESSAGING_DEVICE_PATH]);
    }

    #[test]
    fn hard_drive_node_round_trips() {
        let hd = HardDriveNode {
            partition_number: U32::new(2),
            partition_start: U64::new(0x800),
            partition_size: U64::new(0x10000),
            signature: [0xab; 16],
            mbr_type: 0x02,
            signature_type: SIGNATURE_TYPE_GUID,
        };
        let mut path = DevicePath::end();
        path.append_node(MEDIA_DEVICE_PATH, MEDIA_HARDDRIVE_DP, hd.as_bytes());
        let node = path.nodes().next().unwrap();
        let parsed = node.hard_drive().unwrap();
        assert_eq!(parsed.partition_start.get(), 0x800);
        assert_eq!(parsed.signature, [0xab; 16]);
        assert_eq!(parsed.signature_type, SIGNATURE_TYPE_GUID);
    }

    #[test]
    fn truncated_node_stops_iteration() {
        let mut bytes = sample_path().as_bytes().to_vec();
        bytes.truncate(bytes.len() - 6);
        let path = DevicePath::from_bytes(bytes);
        assert_eq!(path.nodes().count(), 2);
    }

    #[test]
    fn empty_path_has_no_nodes() {
        assert!(DevicePath::end().is_empty());
        assert!(DevicePath::from_bytes(Vec::new()).is_empty());
    }
}
