// TDB - TON Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Compiler-assigned key grouping emitted instructions back to one source location.
pub type DebugSectionId = u32;

/// Assembly instructions attributable to each debug section, ordered by section id.
pub type DebugSectionInstructions = BTreeMap<DebugSectionId, Vec<InstructionInfo>>;

/// File markers identifying standard-library sources that never take part in
/// correlation.
pub const DEFAULT_STDLIB_MARKERS: &[&str] = &["@stdlib", "stdlib.fc", "@ton-stdlib"];

/// One compiler debug record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebugLocation {
    /// Source file the record points into
    pub file: String,
    /// 1-based source line
    pub line: u32,
    /// Column offset within the line
    #[serde(default)]
    pub pos: u32,
    /// Length of the covered source span
    #[serde(default)]
    pub length: u32,
}

impl DebugLocation {
    /// Create a location covering a whole line
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self { file: file.into(), line, pos: 0, length: 0 }
    }

    /// Whether this location must be left out of correlation: it has no file or
    /// points into a standard-library source.
    pub fn is_excluded<S: AsRef<str>>(&self, stdlib_markers: &[S]) -> bool {
        self.file.is_empty() || stdlib_markers.iter().any(|m| self.file.contains(m.as_ref()))
    }

    /// Whether this location belongs to `primary_file`, either exactly or as
    /// the last component of a path.
    pub fn is_in_file(&self, primary_file: &str) -> bool {
        self.file == primary_file ||
            self.file.strip_suffix(primary_file).is_some_and(|prefix| prefix.ends_with('/'))
    }
}

/// Debug map for a higher-level source (FunC or Tolk).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuncMapping {
    /// Ordered map from debug section to the source location that produced it
    pub locations: BTreeMap<DebugSectionId, DebugLocation>,
}

impl FuncMapping {
    /// Location of a debug section, if the compiler recorded one
    pub fn get(&self, id: DebugSectionId) -> Option<&DebugLocation> {
        self.locations.get(&id)
    }
}

impl FromIterator<(DebugSectionId, DebugLocation)> for FuncMapping {
    fn from_iter<T: IntoIterator<Item = (DebugSectionId, DebugLocation)>>(iter: T) -> Self {
        Self { locations: iter.into_iter().collect() }
    }
}

/// Output location of a compiled instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructionLocation {
    /// 0-based line in the generated assembly text
    pub line: u32,
}

/// One compiled assembly instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructionInfo {
    /// Instruction mnemonic
    #[serde(default)]
    pub name: String,
    /// Present when the instruction was printed to the assembly text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<InstructionLocation>,
}

impl InstructionInfo {
    /// Create an instruction printed at the given 0-based assembly line
    pub fn at_line(name: impl Into<String>, line: u32) -> Self {
        Self { name: name.into(), loc: Some(InstructionLocation { line }) }
    }

    /// 1-based assembly line, if the instruction has one
    pub fn asm_line(&self) -> Option<u32> {
        self.loc.map(|loc| loc.line + 1)
    }
}

/// Lookup from a code location reported by the VM to the compiled instruction.
///
/// The toolchain builds this table while decompiling the contract code; the
/// engine only queries it.
pub trait MappingInfo {
    /// Resolve `(code cell hash, bit offset)` to the instruction list of that
    /// cell and the index of the instruction at the offset.
    fn resolve(&self, hash: &str, offset: u32) -> Option<(&[InstructionInfo], usize)>;
}

/// Serialized form of one [`CellMapping`] entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMappingEntry {
    /// Hex-encoded code cell hash
    pub hash: String,
    /// Bit offset inside the cell
    pub offset: u32,
    /// Instructions decompiled from the cell
    pub instructions: Vec<InstructionInfo>,
    /// Index of the instruction located at `offset`
    pub index: usize,
}

/// In-memory [`MappingInfo`] keyed by `(hash, offset)`.
///
/// Hashes are normalized to upper case, so lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CellMappingEntry>", into = "Vec<CellMappingEntry>")]
pub struct CellMapping {
    entries: HashMap<(String, u32), (Vec<InstructionInfo>, usize)>,
}

impl CellMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the instruction list found at `(hash, offset)`
    pub fn insert(
        &mut self,
        hash: impl AsRef<str>,
        offset: u32,
        instructions: Vec<InstructionInfo>,
        index: usize,
    ) {
        self.entries.insert((hash.as_ref().to_ascii_uppercase(), offset), (instructions, index));
    }

    /// Number of registered locations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no location is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MappingInfo for CellMapping {
    fn resolve(&self, hash: &str, offset: u32) -> Option<(&[InstructionInfo], usize)> {
        self.entries
            .get(&(hash.to_ascii_uppercase(), offset))
            .map(|(instructions, index)| (instructions.as_slice(), *index))
    }
}

impl From<Vec<CellMappingEntry>> for CellMapping {
    fn from(entries: Vec<CellMappingEntry>) -> Self {
        let mut mapping = Self::new();
        for entry in entries {
            mapping.insert(entry.hash, entry.offset, entry.instructions, entry.index);
        }
        mapping
    }
}

impl From<CellMapping> for Vec<CellMappingEntry> {
    fn from(mapping: CellMapping) -> Self {
        let mut entries: Self = mapping
            .entries
            .into_iter()
            .map(|((hash, offset), (instructions, index))| CellMappingEntry {
                hash,
                offset,
                instructions,
                index,
            })
            .collect();
        entries.sort_by(|a, b| (&a.hash, a.offset).cmp(&(&b.hash, b.offset)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_locations() {
        tdb_utils::logging::ensure_test_logging(None);

        assert!(DebugLocation::new("", 3).is_excluded(DEFAULT_STDLIB_MARKERS));
        assert!(DebugLocation::new("@stdlib/common.tolk", 3).is_excluded(DEFAULT_STDLIB_MARKERS));
        assert!(DebugLocation::new("imports/stdlib.fc", 3).is_excluded(DEFAULT_STDLIB_MARKERS));
        assert!(!DebugLocation::new("main.fc", 3).is_excluded(DEFAULT_STDLIB_MARKERS));
    }

    #[test]
    fn test_primary_file_matching() {
        tdb_utils::logging::ensure_test_logging(None);

        assert!(DebugLocation::new("main.tolk", 1).is_in_file("main.tolk"));
        assert!(DebugLocation::new("contracts/main.tolk", 1).is_in_file("main.tolk"));
        assert!(!DebugLocation::new("contracts/notmain.tolk", 1).is_in_file("main.tolk"));
        assert!(!DebugLocation::new("helper.tolk", 1).is_in_file("main.tolk"));
    }

    #[test]
    fn test_cell_mapping_resolves_case_insensitively() {
        tdb_utils::logging::ensure_test_logging(None);

        let instrs = vec![InstructionInfo::at_line("PUSHINT", 0), InstructionInfo::at_line("THROW", 1)];
        let mut mapping = CellMapping::new();
        mapping.insert("abcd", 24, instrs.clone(), 1);

        let (found, index) = mapping.resolve("ABCD", 24).unwrap();
        assert_eq!(found, instrs.as_slice());
        assert_eq!(index, 1);
        assert!(mapping.resolve("ABCD", 25).is_none());
    }

    #[test]
    fn test_cell_mapping_json_form() {
        tdb_utils::logging::ensure_test_logging(None);

        let json = r#"[{"hash": "ff", "offset": 8, "instructions": [{"name": "ADD", "loc": {"line": 2}}], "index": 0}]"#;
        let mapping: CellMapping = serde_json::from_str(json).unwrap();

        assert_eq!(mapping.len(), 1);
        let (instrs, index) = mapping.resolve("FF", 8).unwrap();
        assert_eq!(instrs[index].asm_line(), Some(3));
    }
}
