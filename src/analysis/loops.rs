use crate::parser::mask_comments;
use crate::parser::types::LoopSite;
use tracing::debug;

enum Pending {
    None,
    /// Inside a loop header's parentheses. `index` is `None` for the
    /// `while (cond)` tail of a do-while.
    Header {
        index: Option<usize>,
        parens: i32,
        opened: bool,
    },
    /// Header parens closed, waiting to see whether a `{` follows.
    Body { index: usize },
    /// After `do`, waiting for its `{`.
    Do,
}

enum Block {
    Plain,
    Loop(usize),
    Do,
}

/// Loops of one function plus the loops still open at a probe line.
struct LoopScan {
    loops: Vec<LoopSite>,
    open_at_probe: Vec<usize>,
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn keyword_at(text: &str, pos: usize, keyword: &str) -> bool {
    if text[..pos].chars().next_back().is_some_and(is_ident_char) {
        return false;
    }
    text[pos..]
        .strip_prefix(keyword)
        .is_some_and(|after| !after.chars().next().is_some_and(is_ident_char))
}

/// Length of a `for`/`while` keyword starting at `pos`, if it begins a loop header.
fn loop_keyword_at(text: &str, pos: usize) -> Option<usize> {
    ["for", "while"].iter().find_map(|kw| {
        if !keyword_at(text, pos, kw) {
            return None;
        }
        text[pos + kw.len()..]
            .trim_start()
            .starts_with('(')
            .then_some(kw.len())
    })
}

fn scan(lines: &[String], function_start: usize, probe: Option<usize>) -> LoopScan {
    let code = mask_comments(lines);
    let mut loops: Vec<LoopSite> = Vec::new();
    let mut blocks: Vec<Block> = Vec::new();
    let mut pending = Pending::None;
    let mut open_at_probe = Vec::new();
    let mut entered = false;
    // Set right after the `}` of a `do` block, so the next `while` is its tail.
    let mut after_do = false;

    'lines: for (i, text) in code.iter().enumerate().skip(function_start) {
        if Some(i) == probe {
            open_at_probe = blocks
                .iter()
                .filter_map(|b| match b {
                    Block::Loop(index) => Some(*index),
                    _ => None,
                })
                .collect();
        }

        let mut skip_until = 0;
        for (col, ch) in text.char_indices() {
            if col < skip_until {
                continue;
            }

            match pending {
                Pending::Header {
                    index,
                    ref mut parens,
                    ref mut opened,
                } => {
                    match ch {
                        '(' => {
                            *parens += 1;
                            *opened = true;
                        }
                        ')' => *parens -= 1,
                        _ => {}
                    }
                    if *opened && *parens == 0 {
                        pending = match index {
                            Some(index) => Pending::Body { index },
                            None => Pending::None,
                        };
                    }
                    continue;
                }
                Pending::Body { index } => {
                    if ch.is_whitespace() {
                        continue;
                    }
                    pending = Pending::None;
                    if ch == '{' {
                        loops[index].open = Some((i, col));
                        blocks.push(Block::Loop(index));
                        continue;
                    }
                    // Brace-less or empty body: handled as ordinary code below.
                }
                Pending::Do => {
                    if ch.is_whitespace() {
                        continue;
                    }
                    pending = Pending::None;
                    if ch == '{' {
                        blocks.push(Block::Do);
                        continue;
                    }
                }
                Pending::None => {}
            }

            if entered {
                if let Some(len) = loop_keyword_at(text, col) {
                    let index = if after_do && text[col..].starts_with("while") {
                        None
                    } else {
                        loops.push(LoopSite {
                            header_line: i,
                            header_text: lines[i].trim().to_string(),
                            index: loops.len(),
                            open: None,
                            close_line: None,
                        });
                        Some(loops.len() - 1)
                    };
                    after_do = false;
                    pending = Pending::Header {
                        index,
                        parens: 0,
                        opened: false,
                    };
                    skip_until = col + len;
                    continue;
                }
                if keyword_at(text, col, "do") {
                    after_do = false;
                    pending = Pending::Do;
                    skip_until = col + 2;
                    continue;
                }
            }

            if !ch.is_whitespace() {
                after_do = false;
            }
            match ch {
                '{' => {
                    blocks.push(Block::Plain);
                    entered = true;
                }
                '}' => {
                    match blocks.pop() {
                        Some(Block::Loop(index)) => loops[index].close_line = Some(i),
                        Some(Block::Do) => after_do = true,
                        _ => {}
                    }
                    if entered && blocks.is_empty() {
                        break 'lines;
                    }
                }
                _ => {}
            }
        }
    }

    LoopScan {
        loops,
        open_at_probe,
    }
}

/// Every `for`/`while` loop of the function starting at `function_start`,
/// indexed in encounter order.
pub fn find_loops(lines: &[String], function_start: usize) -> Vec<LoopSite> {
    scan(lines, function_start, None).loops
}

/// Braced loops whose body contains `line`, outermost first.
///
/// Loops that close before `line` are excluded. A brace-less loop never
/// encloses anything: code inserted after its single-statement body already
/// runs after the loop.
pub fn find_enclosing_loops(lines: &[String], function_start: usize, line: usize) -> Vec<LoopSite> {
    let result = scan(lines, function_start, Some(line));
    let enclosing: Vec<LoopSite> = result
        .open_at_probe
        .iter()
        .map(|&index| result.loops[index].clone())
        .collect();
    debug!(line, count = enclosing.len(), "enclosing loops");
    enclosing
}
