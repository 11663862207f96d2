// src/tree_codec.rs
//
// Tree layout, pre-order:
//   internal node: 1 <left> 1 <right>
//   leaf:          0 0 <symbol, 8 bits>

use std::io::{Read, Write};

use tracing::debug;

use crate::buffer::{BitReader, BitWriter};
use crate::error::{HuffError, Result};
use crate::frequency::SYMBOLS;
use crate::tree::{MAX_CODE_BITS, TreeNode};

/// A symbol's root-to-leaf path, root first in the high bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeEntry {
    bits: u64,
    len: u32,
}

impl CodeEntry {
    pub fn new(bits: u64, len: u32) -> Self {
        debug_assert!(len <= MAX_CODE_BITS);
        Self { bits, len }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if `self` is a leading part of `other` (or equal to it).
    pub fn is_prefix_of(&self, other: &CodeEntry) -> bool {
        self.len <= other.len
            && other.bits.checked_shr(other.len - self.len).unwrap_or(0) == self.bits
    }

    fn push(&mut self, bit: bool) -> Result<()> {
        if self.len == MAX_CODE_BITS {
            return Err(HuffError::malformed(format!(
                "code longer than {} bits",
                MAX_CODE_BITS
            )));
        }
        self.bits = (self.bits << 1) | bit as u64;
        self.len += 1;
        Ok(())
    }

    fn set_last(&mut self) {
        self.bits |= 1;
    }

    fn pop(&mut self) {
        self.bits >>= 1;
        self.len -= 1;
    }
}

/// Code of every symbol present in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    entries: [Option<CodeEntry>; SYMBOLS],
}

impl CodeTable {
    fn empty() -> Self {
        Self {
            entries: [None; SYMBOLS],
        }
    }

    pub fn get(&self, symbol: u8) -> Option<CodeEntry> {
        self.entries[symbol as usize]
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, CodeEntry)> + '_ {
        (0..=u8::MAX).filter_map(|symbol| self.get(symbol).map(|code| (symbol, code)))
    }
}

/// Serializes `root` into `writer` and returns the code of every leaf.
pub fn write_tree<W: Write>(root: &TreeNode, writer: &mut BitWriter<W>) -> Result<CodeTable> {
    let mut table = CodeTable::empty();
    let mut path = CodeEntry::default();
    let start = writer.bits_appended();
    write_node(root, writer, &mut path, &mut table)?;
    debug!(
        bits = writer.bits_appended() - start,
        symbols = table.len(),
        "wrote prefix tree"
    );
    Ok(table)
}

fn write_node<W: Write>(
    node: &TreeNode,
    writer: &mut BitWriter<W>,
    path: &mut CodeEntry,
    table: &mut CodeTable,
) -> Result<()> {
    match node {
        TreeNode::Leaf { symbol, .. } => {
            writer.append_bit(false)?;
            writer.append_bit(false)?;
            writer.append_bits(u64::from(*symbol), 8)?;
            table.entries[*symbol as usize] = Some(*path);
        }
        TreeNode::Internal { left, right, .. } => {
            path.push(false)?;
            writer.append_bit(true)?;
            write_node(left, writer, path, table)?;

            path.set_last();
            writer.append_bit(true)?;
            write_node(right, writer, path, table)?;

            path.pop();
        }
    }
    Ok(())
}

/// Reads a tree written by [`write_tree`]. Rejects trees deeper than the
/// code limit, nodes with only a left child, and repeated symbols.
pub fn read_tree<R: Read>(reader: &mut BitReader<R>) -> Result<TreeNode> {
    let mut seen = [false; SYMBOLS];
    let root = read_node(reader, 0, &mut seen)?;
    debug!(leaves = root.leaf_count(), depth = root.depth(), "read prefix tree");
    Ok(root)
}

fn read_node<R: Read>(
    reader: &mut BitReader<R>,
    depth: u32,
    seen: &mut [bool; SYMBOLS],
) -> Result<TreeNode> {
    if depth > MAX_CODE_BITS {
        return Err(HuffError::malformed(format!(
            "tree deeper than {} levels",
            MAX_CODE_BITS
        )));
    }

    let left = if reader.next_bit()? {
        Some(read_node(reader, depth + 1, seen)?)
    } else {
        None
    };

    if reader.next_bit()? {
        let right = read_node(reader, depth + 1, seen)?;
        return match left {
            Some(left) => Ok(TreeNode::merge(left, right)),
            None => Err(HuffError::malformed("tree node has a right child only")),
        };
    }
    if left.is_some() {
        return Err(HuffError::malformed("tree node has a left child only"));
    }

    let symbol = reader.read_aligned_byte()?;
    if std::mem::replace(&mut seen[symbol as usize], true) {
        return Err(HuffError::malformed(format!(
            "symbol {:#04x} appears twice in the tree",
            symbol
        )));
    }
    Ok(TreeNode::leaf(symbol, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;
    use crate::tree::build_tree;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn serialize(root: &TreeNode) -> (Vec<u8>, CodeTable) {
        let mut writer = BitWriter::new(Vec::new(), 4).unwrap();
        let table = write_tree(root, &mut writer).unwrap();
        writer.finish().unwrap();
        (writer.into_inner(), table)
    }

    fn deserialize(bytes: Vec<u8>) -> Result<TreeNode> {
        let mut reader = BitReader::new(Cursor::new(bytes), 3)?;
        read_tree(&mut reader)
    }

    fn tree_for(data: &[u8]) -> TreeNode {
        build_tree(&FrequencyTable::from_bytes(data)).unwrap().unwrap()
    }

    fn assert_prefix_free(table: &CodeTable) {
        let codes: Vec<_> = table.iter().collect();
        for (i, (a_sym, a)) in codes.iter().enumerate() {
            for (b_sym, b) in &codes[i + 1..] {
                assert!(
                    !a.is_prefix_of(b) && !b.is_prefix_of(a),
                    "codes of {} and {} overlap",
                    a_sym,
                    b_sym
                );
            }
        }
    }

    #[test]
    fn codes_follow_tree_paths() {
        let (_, table) = serialize(&tree_for(b"abracadabra"));
        assert_eq!(table.len(), 5);
        assert_eq!(table.get(b'a'), Some(CodeEntry::new(0b1, 1)));
        assert_eq!(table.get(b'b'), Some(CodeEntry::new(0b01, 2)));
        assert_eq!(table.get(b'r'), Some(CodeEntry::new(0b000, 3)));
        assert_eq!(table.get(b'c'), Some(CodeEntry::new(0b0010, 4)));
        assert_eq!(table.get(b'd'), Some(CodeEntry::new(0b0011, 4)));
        assert_eq!(table.get(b'z'), None);
        assert_prefix_free(&table);
    }

    #[test]
    fn single_leaf_layout() {
        let (bytes, table) = serialize(&TreeNode::leaf(0x41, 9));
        assert_eq!(bytes, vec![0x10, 0x40, 0, 0, 0, 0, 0, 0]);
        assert_eq!(table.get(0x41), Some(CodeEntry::new(0, 0)));
        assert!(table.get(0x41).unwrap().is_empty());

        let read = deserialize(bytes).unwrap();
        assert_eq!(read, TreeNode::leaf(0x41, 0));
    }

    #[test]
    fn two_leaf_layout() {
        let root = TreeNode::merge(TreeNode::leaf(0x00, 1), TreeNode::leaf(0xFF, 1));
        let (bytes, _) = serialize(&root);
        // 1 00 00000000 1 00 11111111
        assert_eq!(&bytes[..3], &[0b1000_0000, 0b0001_0011, 0b1111_1100]);
    }

    #[test]
    fn full_alphabet_round_trips() {
        let mut counts = [0u64; SYMBOLS];
        for (i, slot) in counts.iter_mut().enumerate() {
            *slot = 1 + (i as u64 * 7919) % 1000;
        }
        let root = build_tree(&FrequencyTable::from(counts)).unwrap().unwrap();
        let (bytes, table) = serialize(&root);
        assert_eq!(table.len(), 256);
        assert_prefix_free(&table);

        let read = deserialize(bytes).unwrap();
        assert_eq!(read.leaf_count(), 256);
        assert_eq!(read.leaf_depths(), root.leaf_depths());
    }

    #[test]
    fn code_lengths_match_leaf_depths() {
        let root = tree_for(b"mississippi river banks");
        let (_, table) = serialize(&root);
        for (symbol, depth) in root.leaf_depths() {
            assert_eq!(table.get(symbol).unwrap().len(), depth);
        }
    }

    #[test]
    fn truncated_tree_is_rejected() {
        assert!(matches!(
            deserialize(vec![0b1100_0000]),
            Err(HuffError::MalformedStream(_))
        ));
        assert!(matches!(
            deserialize(Vec::new()),
            Err(HuffError::MalformedStream(_))
        ));
    }

    #[test]
    fn repeated_symbol_is_rejected() {
        let root = TreeNode::merge(TreeNode::leaf(5, 1), TreeNode::leaf(5, 1));
        let (bytes, _) = serialize(&root);
        assert!(matches!(
            deserialize(bytes),
            Err(HuffError::MalformedStream(_))
        ));
    }

    #[test]
    fn left_only_node_is_rejected() {
        let mut writer = BitWriter::new(Vec::new(), 4).unwrap();
        writer.append_bit(true).unwrap();
        writer.append_bits(0b00, 2).unwrap();
        writer.append_bits(0x41, 8).unwrap();
        writer.append_bit(false).unwrap();
        writer.append_bits(0x42, 8).unwrap();
        writer.finish().unwrap();
        assert!(matches!(
            deserialize(writer.into_inner()),
            Err(HuffError::MalformedStream(_))
        ));
    }

    #[test]
    fn runaway_depth_is_rejected() {
        let err = deserialize(vec![0xFF; 16]).unwrap_err();
        assert!(err.to_string().contains("deeper"), "{}", err);
    }

    #[test]
    fn prefix_check() {
        let short = CodeEntry::new(0b10, 2);
        assert!(short.is_prefix_of(&CodeEntry::new(0b1011, 4)));
        assert!(!short.is_prefix_of(&CodeEntry::new(0b0110, 4)));
        assert!(!CodeEntry::new(0b1011, 4).is_prefix_of(&short));
        assert!(CodeEntry::default().is_prefix_of(&CodeEntry::new(u64::MAX, 64)));
    }

    proptest! {
        #[test]
        fn prop_codes_are_prefix_free(data in prop::collection::vec(any::<u8>(), 1..2000)) {
            let root = tree_for(&data);
            let (bytes, table) = serialize(&root);
            prop_assert_eq!(table.len(), FrequencyTable::from_bytes(&data).distinct());
            let codes: Vec<_> = table.iter().map(|(_, code)| code).collect();
            for (i, a) in codes.iter().enumerate() {
                for b in &codes[i + 1..] {
                    prop_assert!(!a.is_prefix_of(b) && !b.is_prefix_of(a));
                }
            }
            prop_assert_eq!(deserialize(bytes).unwrap().leaf_depths(), root.leaf_depths());
        }
    }
}
