use crate::srt::{CaptionEntry, CaptionTrack};

use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{digit1, hex_digit1, one_of, space0};
use nom::combinator::{cut, map, opt};
use nom::sequence::preceded;
use nom::IResult;
use regex::{Captures, Regex};
use tracing::debug;

// Two digits for hours, minutes and seconds, three for milliseconds. `\d`
// would also accept non-ASCII digits.
const TIMING_PATTERN: &str = concat!(
    r"([0-9]{2}):([0-9]{2}):([0-9]{2}),([0-9]{3})",
    " --> ",
    r"([0-9]{2}):([0-9]{2}):([0-9]{2}),([0-9]{3})",
);

const BLOCK_SEPARATOR: &str = "\n\n";

/// Parse SRT text into a track, silently skipping malformed cue blocks.
///
/// This never fails: input that contains no recognisable cue yields an
/// empty track.
pub fn parse(input: &str) -> CaptionTrack {
    parse_with_diagnostics(input).track
}

/// Parse SRT text, additionally reporting every block that was dropped or
/// only partially understood.
pub fn parse_with_diagnostics(input: &str) -> ParseOutcome {
    let normalised = normalise(input);
    let leading = leading_whitespace(&normalised);
    let content = normalised.trim();

    let mut line = 1 + count_newlines(leading);
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();

    for (block, raw_block) in content.split(BLOCK_SEPARATOR).enumerate() {
        let block_line = line + count_newlines(leading_whitespace(raw_block));
        line += count_newlines(raw_block) + count_newlines(BLOCK_SEPARATOR);

        let text = raw_block.trim();
        if text.is_empty() {
            continue;
        }

        let mut report = |problem: Problem| {
            debug!(block, line = block_line, "{}", problem);
            diagnostics.push(Diagnostic {
                block,
                line: block_line,
                problem,
                text: text.to_string(),
            });
        };

        match cue(text) {
            Ok(entry) => {
                if entry.sequence_number.is_none() {
                    report(Problem::UnparseableIndex);
                }
                entries.push(entry);
            }
            Err(problem) => report(problem),
        }
    }

    ParseOutcome {
        track: CaptionTrack::new(entries),
        diagnostics,
    }
}

/// The result of [`parse_with_diagnostics`].
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub track: CaptionTrack,
    pub diagnostics: Vec<Diagnostic>,
}

/// A cue block that was dropped, or kept with a degraded field.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Position of the block among all blocks of the file, starting at 0.
    pub block: usize,
    /// Line of the file on which the block starts, starting at 1.
    pub line: usize,
    pub problem: Problem,
    /// The block as it appeared in the file, without surrounding whitespace.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    /// Fewer than the three lines (index, timing, text) a cue needs. Dropped.
    TooFewLines { found: usize },
    /// The second line holds no `HH:MM:SS,mmm --> HH:MM:SS,mmm` range. Dropped.
    MalformedTiming,
    /// The index line does not start with an integer. Kept.
    UnparseableIndex,
}

impl Problem {
    pub fn is_dropped(&self) -> bool {
        !matches!(self, Problem::UnparseableIndex)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Problem::TooFewLines { found } => write!(
                fmt,
                "Dropped cue block with {} line(s); expected an index, a timing line and text",
                found
            ),
            Problem::MalformedTiming => write!(fmt, "Dropped cue block with malformed timing line"),
            Problem::UnparseableIndex => write!(fmt, "Cue index is not a number"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "line {}: {}", self.line, self.problem)
    }
}

fn normalise(input: &str) -> Cow<'_, str> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    if input.contains("\r\n") {
        Cow::Owned(input.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(input)
    }
}

fn leading_whitespace(s: &str) -> &str {
    &s[..s.len() - s.trim_start().len()]
}

fn count_newlines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}

fn cue(block: &str) -> Result<CaptionEntry, Problem> {
    let lines: Vec<&str> = block.split('\n').collect();
    if lines.len() < 3 {
        return Err(Problem::TooFewLines { found: lines.len() });
    }

    let caps = timing_regex()
        .captures(lines[1])
        .ok_or(Problem::MalformedTiming)?;

    Ok(CaptionEntry {
        sequence_number: sequence_number(lines[0]),
        start_time: seconds(&caps, 1),
        end_time: seconds(&caps, 5),
        text: lines[2..].join("\n"),
    })
}

fn timing_regex() -> &'static Regex {
    static TIMING: OnceLock<Regex> = OnceLock::new();
    TIMING.get_or_init(|| Regex::new(TIMING_PATTERN).expect("timing pattern is a valid regex"))
}

/// Convert the four capture groups starting at `first` (hours, minutes,
/// seconds, milliseconds) into seconds.
fn seconds(caps: &Captures, first: usize) -> f64 {
    let group = |i: usize| {
        caps.get(first + i)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map_or(0.0, f64::from)
    };
    group(0) * 3600.0 + group(1) * 60.0 + group(2) + group(3) / 1000.0
}

fn sequence_number(line: &str) -> Option<i64> {
    integer_prefix(line).ok().map(|(_, n)| n)
}

/// Leading whitespace, an optional sign, then decimal digits or `0x` and
/// hex digits. Whatever follows the digits is ignored, so `12a` reads as 12.
/// Values beyond the range of `i64` saturate.
fn integer_prefix(input: &str) -> IResult<&str, i64> {
    let (input, _) = space0(input)?;
    let (input, sign) = opt(one_of("+-"))(input)?;
    let (input, magnitude) = alt((
        preceded(
            tag_no_case("0x"),
            cut(map(hex_digit1, |s: &str| saturating_value(s, 16))),
        ),
        map(digit1, |s: &str| saturating_value(s, 10)),
    ))(input)?;

    match sign {
        Some('-') => Ok((input, -magnitude)),
        _ => Ok((input, magnitude)),
    }
}

fn saturating_value(digits: &str, radix: u32) -> i64 {
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0i64, |acc, d| {
            acc.saturating_mul(i64::from(radix))
                .saturating_add(i64::from(d))
        })
}
