//! Pattern parser and Thompson-style code generator.
//!
//! The parser builds a small syntax tree which is then lowered into a flat program of
//! [`Inst`]ructions. Alternation and quantifiers lower to `Split`/`Jump`; capture groups to
//! a pair of `Save` slots. Slots 0 and 1 always hold the bounds of the whole match.

use super::RegexError;

/// Largest count accepted in `{n,m}`.
pub const MAX_REPEAT: u32 = 1000;
/// Largest program the compiler will emit.
pub const MAX_PROGRAM: usize = 1 << 16;
/// Deepest group nesting the parser accepts. Parsing, code generation and drop all
/// recurse once per level.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    Char(u8),
    Any,
    Class { ranges: Vec<(u8, u8)>, negated: bool },
    Split(usize, usize),
    Jump(usize),
    AssertBegin,
    AssertEnd,
    Save(usize),
    Match,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub insts: Vec<Inst>,
    /// Number of capturing groups, the implicit whole-match group excluded.
    pub groups: usize,
}

impl Program {
    pub fn slot_count(&self) -> usize {
        2 * (self.groups + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Empty,
    Char(u8),
    Any,
    Class(Vec<(u8, u8)>, bool),
    Begin,
    End,
    Group(Box<Node>, Option<usize>),
    Concat(Vec<Node>),
    Alt(Vec<Node>),
    Repeat {
        node: Box<Node>,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    },
}

const DIGIT: &[(u8, u8)] = &[(b'0', b'9')];
const WORD: &[(u8, u8)] = &[(b'0', b'9'), (b'A', b'Z'), (b'_', b'_'), (b'a', b'z')];
const SPACE: &[(u8, u8)] = &[(b'\t', b'\r'), (b' ', b' ')];

/// Every byte outside `ranges`, which must be sorted and disjoint.
fn complement(ranges: &[(u8, u8)]) -> Vec<(u8, u8)> {
    let mut out = Vec::with_capacity(ranges.len() + 1);
    let mut next = 0u16;
    for &(lo, hi) in ranges {
        if (lo as u16) > next {
            out.push((next as u8, lo - 1));
        }
        next = hi as u16 + 1;
    }
    if next <= 0xff {
        out.push((next as u8, 0xff));
    }
    out
}

struct Parser<'p> {
    pattern: &'p [u8],
    pos: usize,
    groups: usize,
    depth: usize,
}

impl<'p> Parser<'p> {
    fn error(&self, msg: &'static str) -> RegexError {
        RegexError::Syntax { pos: self.pos, msg }
    }

    fn peek(&self) -> Option<u8> {
        self.pattern.get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse(mut self) -> Result<(Node, usize), RegexError> {
        let node = self.alternation()?;
        if self.pos < self.pattern.len() {
            // only an unbalanced ')' stops the top level early
            return Err(self.error("unmatched ')'"));
        }
        Ok((node, self.groups))
    }

    fn alternation(&mut self) -> Result<Node, RegexError> {
        let mut branches = vec![self.concat()?];
        while self.eat(b'|') {
            branches.push(self.concat()?);
        }
        Ok(if branches.len() == 1 {
            branches.remove(0)
        } else {
            Node::Alt(branches)
        })
    }

    fn concat(&mut self) -> Result<Node, RegexError> {
        let mut items = Vec::new();
        while let Some(b) = self.peek() {
            if b == b'|' || b == b')' {
                break;
            }
            items.push(self.repeat()?);
        }
        Ok(match items.len() {
            0 => Node::Empty,
            1 => items.remove(0),
            _ => Node::Concat(items),
        })
    }

    fn repeat(&mut self) -> Result<Node, RegexError> {
        let atom = self.atom()?;
        let start = self.pos;
        let (min, max) = match self.peek() {
            Some(b'*') => (0, None),
            Some(b'+') => (1, None),
            Some(b'?') => (0, Some(1)),
            Some(b'{') => match self.bounds()? {
                Some(bounds) => bounds,
                None => return Ok(atom),
            },
            _ => return Ok(atom),
        };
        if self.pos == start {
            self.pos += 1;
        }
        let greedy = !self.eat(b'?');

        if matches!(self.peek(), Some(b'*' | b'+' | b'?')) {
            return Err(self.error("nested quantifier"));
        }
        Ok(Node::Repeat {
            node: Box::new(atom),
            min,
            max,
            greedy,
        })
    }

    /// Parses `{n}`, `{n,}` or `{n,m}`. A `{` that does not start a valid bound is left for
    /// the caller to treat as a literal.
    fn bounds(&mut self) -> Result<Option<(u32, Option<u32>)>, RegexError> {
        let save = self.pos;
        self.pos += 1;
        let Some(min) = self.number()? else {
            self.pos = save;
            return Ok(None);
        };
        let max = if self.eat(b',') { self.number()? } else { Some(min) };
        if !self.eat(b'}') {
            self.pos = save;
            return Ok(None);
        }
        if let Some(max) = max {
            if max < min {
                return Err(self.error("repetition bounds out of order"));
            }
        }
        Ok(Some((min, max)))
    }

    fn number(&mut self) -> Result<Option<u32>, RegexError> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(d @ b'0'..=b'9') = self.peek() {
            value = value.saturating_mul(10).saturating_add((d - b'0') as u32);
            self.pos += 1;
        }
        if self.pos == start {
            return Ok(None);
        }
        if value > MAX_REPEAT {
            return Err(self.error("repetition count too large"));
        }
        Ok(Some(value))
    }

    fn atom(&mut self) -> Result<Node, RegexError> {
        let Some(b) = self.peek() else {
            return Err(self.error("unexpected end of pattern"));
        };
        self.pos += 1;

        match b {
            b'(' => {
                if self.depth == MAX_NESTING {
                    self.pos -= 1;
                    return Err(self.error("nesting too deep"));
                }
                self.depth += 1;
                let index = if self.pattern[self.pos..].starts_with(b"?:") {
                    self.pos += 2;
                    None
                } else {
                    self.groups += 1;
                    Some(self.groups - 1)
                };
                let inner = self.alternation()?;
                if !self.eat(b')') {
                    return Err(self.error("missing ')'"));
                }
                self.depth -= 1;
                Ok(Node::Group(Box::new(inner), index))
            }
            b'.' => Ok(Node::Any),
            b'^' => Ok(Node::Begin),
            b'$' => Ok(Node::End),
            b'[' => self.class(),
            b'\\' => self.escape(),
            b'*' | b'+' | b'?' => {
                self.pos -= 1;
                Err(self.error("nothing to repeat"))
            }
            _ => Ok(Node::Char(b)),
        }
    }

    fn escape(&mut self) -> Result<Node, RegexError> {
        let Some(b) = self.peek() else {
            return Err(self.error("trailing backslash"));
        };
        self.pos += 1;

        Ok(match b {
            b'd' => Node::Class(DIGIT.to_vec(), false),
            b'D' => Node::Class(DIGIT.to_vec(), true),
            b'w' => Node::Class(WORD.to_vec(), false),
            b'W' => Node::Class(WORD.to_vec(), true),
            b's' => Node::Class(SPACE.to_vec(), false),
            b'S' => Node::Class(SPACE.to_vec(), true),
            other => Node::Char(literal_escape(other)),
        })
    }

    fn class(&mut self) -> Result<Node, RegexError> {
        let negated = self.eat(b'^');
        let mut ranges = Vec::new();
        let mut first = true;

        loop {
            let Some(b) = self.peek() else {
                return Err(self.error("unterminated character class"));
            };
            self.pos += 1;
            if b == b']' && !first {
                break;
            }
            first = false;

            let lo = if b == b'\\' {
                let Some(e) = self.peek() else {
                    return Err(self.error("trailing backslash"));
                };
                self.pos += 1;
                match e {
                    b'd' => {
                        ranges.extend_from_slice(DIGIT);
                        continue;
                    }
                    b'w' => {
                        ranges.extend_from_slice(WORD);
                        continue;
                    }
                    b's' => {
                        ranges.extend_from_slice(SPACE);
                        continue;
                    }
                    b'D' => {
                        ranges.extend(complement(DIGIT));
                        continue;
                    }
                    b'W' => {
                        ranges.extend(complement(WORD));
                        continue;
                    }
                    b'S' => {
                        ranges.extend(complement(SPACE));
                        continue;
                    }
                    other => literal_escape(other),
                }
            } else {
                b
            };

            // `a-z`, but a '-' before the closing bracket is literal
            let is_range = self.peek() == Some(b'-')
                && self.pattern.get(self.pos + 1).is_some_and(|&n| n != b']');
            if is_range {
                self.pos += 1;
                let mut hi = self.pattern[self.pos];
                self.pos += 1;
                if hi == b'\\' {
                    let Some(e) = self.peek() else {
                        return Err(self.error("trailing backslash"));
                    };
                    self.pos += 1;
                    hi = literal_escape(e);
                }
                if hi < lo {
                    return Err(self.error("character range out of order"));
                }
                ranges.push((lo, hi));
            } else {
                ranges.push((lo, lo));
            }
        }
        Ok(Node::Class(ranges, negated))
    }
}

fn literal_escape(b: u8) -> u8 {
    match b {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        other => other,
    }
}

struct Codegen {
    insts: Vec<Inst>,
    ungreedy: bool,
}

impl Codegen {
    fn push(&mut self, inst: Inst) -> Result<usize, RegexError> {
        if self.insts.len() >= MAX_PROGRAM {
            return Err(RegexError::TooLarge);
        }
        self.insts.push(inst);
        Ok(self.insts.len() - 1)
    }

    fn pc(&self) -> usize {
        self.insts.len()
    }

    fn split(&mut self, at: usize, prefer: usize, other: usize, greedy: bool) {
        self.insts[at] = if greedy {
            Inst::Split(prefer, other)
        } else {
            Inst::Split(other, prefer)
        };
    }

    fn emit(&mut self, node: &Node) -> Result<(), RegexError> {
        match node {
            Node::Empty => {}
            Node::Char(c) => {
                self.push(Inst::Char(*c))?;
            }
            Node::Any => {
                self.push(Inst::Any)?;
            }
            Node::Class(ranges, negated) => {
                self.push(Inst::Class {
                    ranges: ranges.clone(),
                    negated: *negated,
                })?;
            }
            Node::Begin => {
                self.push(Inst::AssertBegin)?;
            }
            Node::End => {
                self.push(Inst::AssertEnd)?;
            }
            Node::Group(inner, None) => self.emit(inner)?,
            Node::Group(inner, Some(index)) => {
                self.push(Inst::Save(2 * index + 2))?;
                self.emit(inner)?;
                self.push(Inst::Save(2 * index + 3))?;
            }
            Node::Concat(items) => {
                for item in items {
                    self.emit(item)?;
                }
            }
            Node::Alt(branches) => {
                let mut jumps = Vec::with_capacity(branches.len());
                for (i, branch) in branches.iter().enumerate() {
                    if i + 1 < branches.len() {
                        let split = self.push(Inst::Match)?;
                        self.emit(branch)?;
                        jumps.push(self.push(Inst::Match)?);
                        let next = self.pc();
                        self.insts[split] = Inst::Split(split + 1, next);
                    } else {
                        self.emit(branch)?;
                    }
                }
                let end = self.pc();
                for jump in jumps {
                    self.insts[jump] = Inst::Jump(end);
                }
            }
            Node::Repeat {
                node,
                min,
                max,
                greedy,
            } => {
                let greedy = *greedy != self.ungreedy;
                for _ in 0..*min {
                    self.emit(node)?;
                }
                match max {
                    None => {
                        // L: split body, out; body; jump L
                        let split = self.push(Inst::Match)?;
                        self.emit(node)?;
                        self.push(Inst::Jump(split))?;
                        let out = self.pc();
                        self.split(split, split + 1, out, greedy);
                    }
                    Some(max) => {
                        let mut splits = Vec::new();
                        for _ in *min..*max {
                            splits.push(self.push(Inst::Match)?);
                            self.emit(node)?;
                        }
                        let out = self.pc();
                        for split in splits {
                            self.split(split, split + 1, out, greedy);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Compiles `pattern` into a program. `ungreedy` inverts the preference of every quantifier.
pub fn compile(pattern: &[u8], ungreedy: bool) -> Result<Program, RegexError> {
    let parser = Parser {
        pattern,
        pos: 0,
        groups: 0,
        depth: 0,
    };
    let (root, groups) = parser.parse()?;

    let mut codegen = Codegen {
        insts: Vec::new(),
        ungreedy,
    };
    codegen.push(Inst::Save(0))?;
    codegen.emit(&root)?;
    codegen.push(Inst::Save(1))?;
    codegen.push(Inst::Match)?;

    Ok(Program {
        insts: codegen.insts,
        groups,
    })
}
