//! Backtracking evaluator over `(pc, sp)` states.
//!
//! Alternatives are kept on an explicit stack instead of the call stack, so deeply nested
//! quantifiers cannot overflow it. Every `(pc, sp)` state is evaluated at most once per
//! search: a state that was reached before and did not lead to `Match` cannot succeed the
//! second time either, since the outcome only depends on `pc` and `sp`. This also prunes
//! loops whose body matches the empty string.

use super::RegexError;
use super::compile::{Inst, Program};

#[derive(Debug, Copy, Clone, Default)]
pub struct Flags {
    pub icase: bool,
    pub multiline: bool,
    pub dotall: bool,
    pub anchored: bool,
}

enum Frame {
    Try { pc: usize, sp: usize },
    Restore { slot: usize, old: Option<usize> },
}

struct Visited {
    bits: Vec<u64>,
    stride: usize,
}

impl Visited {
    fn new(insts: usize, text_len: usize) -> Result<Self, RegexError> {
        let stride = text_len + 1;
        let words = insts
            .checked_mul(stride)
            .ok_or(RegexError::OutOfMemory)?
            .div_ceil(64);
        let mut bits = Vec::new();
        bits.try_reserve_exact(words)
            .map_err(|_| RegexError::OutOfMemory)?;
        bits.resize(words, 0);
        Ok(Self { bits, stride })
    }

    /// Marks the state and reports whether it was already marked.
    fn test_and_set(&mut self, pc: usize, sp: usize) -> bool {
        let index = pc * self.stride + sp;
        let (word, bit) = (index / 64, 1u64 << (index % 64));
        let seen = self.bits[word] & bit != 0;
        self.bits[word] |= bit;
        seen
    }
}

fn fold(b: u8, icase: bool) -> u8 {
    if icase { b.to_ascii_lowercase() } else { b }
}

fn class_matches(ranges: &[(u8, u8)], negated: bool, b: u8, icase: bool) -> bool {
    let hit = |c: u8| ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
    let found = if icase {
        hit(b) || hit(b.to_ascii_lowercase()) || hit(b.to_ascii_uppercase())
    } else {
        hit(b)
    };
    found != negated
}

/// Runs `program` against `text` and returns the capture slots of the first match.
///
/// Start positions are tried left to right (only position 0 when anchored).
pub fn search(
    program: &Program,
    flags: Flags,
    text: &[u8],
) -> Result<Option<Vec<Option<usize>>>, RegexError> {
    let insts = &program.insts;
    let mut visited = Visited::new(insts.len(), text.len())?;
    let mut stack = Vec::new();
    let last_start = if flags.anchored { 0 } else { text.len() };

    for start in 0..=last_start {
        let mut slots = vec![None; program.slot_count()];
        stack.clear();
        stack.push(Frame::Try { pc: 0, sp: start });

        while let Some(frame) = stack.pop() {
            let (mut pc, mut sp) = match frame {
                Frame::Restore { slot, old } => {
                    slots[slot] = old;
                    continue;
                }
                Frame::Try { pc, sp } => (pc, sp),
            };

            loop {
                let inst = insts.get(pc).ok_or(RegexError::MalformedProgram)?;
                if visited.test_and_set(pc, sp) {
                    break;
                }

                match inst {
                    Inst::Char(c) => {
                        match text.get(sp) {
                            Some(&b) if fold(b, flags.icase) == fold(*c, flags.icase) => {}
                            _ => break,
                        }
                        pc += 1;
                        sp += 1;
                    }
                    Inst::Any => {
                        match text.get(sp) {
                            Some(&b) if flags.dotall || b != b'\n' => {}
                            _ => break,
                        }
                        pc += 1;
                        sp += 1;
                    }
                    Inst::Class { ranges, negated } => {
                        match text.get(sp) {
                            Some(&b) if class_matches(ranges, *negated, b, flags.icase) => {}
                            _ => break,
                        }
                        pc += 1;
                        sp += 1;
                    }
                    Inst::Split(x, y) => {
                        stack.push(Frame::Try { pc: *y, sp });
                        pc = *x;
                    }
                    Inst::Jump(x) => pc = *x,
                    Inst::AssertBegin => {
                        let at_begin =
                            sp == 0 || (flags.multiline && text[sp - 1] == b'\n');
                        if !at_begin {
                            break;
                        }
                        pc += 1;
                    }
                    Inst::AssertEnd => {
                        let at_end = sp == text.len() || (flags.multiline && text[sp] == b'\n');
                        if !at_end {
                            break;
                        }
                        pc += 1;
                    }
                    Inst::Save(slot) => {
                        let cell = slots.get_mut(*slot).ok_or(RegexError::MalformedProgram)?;
                        stack.push(Frame::Restore {
                            slot: *slot,
                            old: *cell,
                        });
                        *cell = Some(sp);
                        pc += 1;
                    }
                    Inst::Match => return Ok(Some(slots)),
                }
            }
        }
    }
    Ok(None)
}
