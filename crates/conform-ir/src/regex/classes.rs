//! Named character categories (`\d \D \w \W \s \S`) and the UTF-8
//! continuation-byte plumbing shared by `.` and negated classes (§4.2).

use crate::builder::byte_range;
use crate::builder::join;
use crate::builder::select;
use crate::byteset::ByteSet;
use crate::node::Node;

pub fn digit() -> ByteSet {
    ByteSet::range(b'0', b'9')
}

pub fn word() -> ByteSet {
    let mut s = ByteSet::range(b'0', b'9');
    s.union_with(&ByteSet::range(b'a', b'z'));
    s.union_with(&ByteSet::range(b'A', b'Z'));
    s.insert(b'_');
    s
}

pub fn space() -> ByteSet {
    let mut s = ByteSet::EMPTY;
    for b in [b' ', b'\t', b'\n', b'\r', 0x0Bu8, 0x0Cu8] {
        s.insert(b);
    }
    s
}

/// Every byte that may legally begin a well-formed UTF-8 encoded scalar
/// value: ASCII, or a 2/3/4-byte sequence lead byte (§4.2: "...the
/// complement of the positive set against the valid UTF-8 starting-byte
/// set").
pub fn utf8_start_set() -> ByteSet {
    let mut s = ByteSet::range(0x00, 0x7F);
    s.union_with(&ByteSet::range(0xC2, 0xDF));
    s.union_with(&ByteSet::range(0xE0, 0xEF));
    s.union_with(&ByteSet::range(0xF0, 0xF4));
    s
}

fn continuation() -> Node {
    byte_range(0x80, 0xBF)
}

/// Compiles a set of UTF-8 *starting* bytes into IR that also consumes the
/// correct number of continuation bytes for multi-byte lead bytes, so that
/// only well-formed UTF-8 is ever produced (§4.2).
pub fn compile_utf8_leads(set: ByteSet) -> Node {
    let mut alts = Vec::new();
    for b in set.iter() {
        match b {
            0x00..=0x7F => alts.push(byte_range(b, b)),
            0xC2..=0xDF => alts.push(join([byte_range(b, b), continuation()])),
            0xE0..=0xEF => {
                alts.push(join([byte_range(b, b), continuation(), continuation()]))
            }
            0xF0..=0xF4 => alts.push(join([
                byte_range(b, b),
                continuation(),
                continuation(),
                continuation(),
            ])),
            // 0x80..=0xC1 and 0xF5..=0xFF can never start a well-formed
            // UTF-8 sequence; silently excluded even if present in `set`.
            _ => {}
        }
    }
    select(alts, false)
}

/// `.`: any scalar value, excluding `\n` unless `dot_all`.
pub fn compile_any_char(dot_all: bool) -> Node {
    let mut set = utf8_start_set();
    if !dot_all {
        // `\n` is ASCII and therefore a lead byte for itself; removing it
        // from the lead set is sufficient to exclude the whole character.
        set = set
            .iter()
            .filter(|b| *b != b'\n')
            .collect::<ByteSet>();
    }
    compile_utf8_leads(set)
}
