/*!
Parsers for the textual formats of abstract argumentation frameworks.

# ASPARTIX (`apx`)
```plain
arg(a).
arg("b c").
att(a,"b c").   % comments start with a percent sign
```
Each argument is declared by `arg(<id>).`, each attack by `att(<attacker>,<target>).`; an id is either alphanumeric (`_` and `-` allowed) or quoted.
Declaring an argument twice is allowed and has no effect.

# ICCMA (`af`)
```plain
p af 3
# comment
1 2
2 3
```
The header `p af <n>` declares the arguments `1` to `n`, every further line `<i> <j>` an attack of `i` on `j`.
*/

use std::{collections::HashSet, path::Path};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, digit1, multispace1, not_line_ending, space0, space1},
    combinator::{all_consuming, map, map_res, value},
    multi::many0,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};
use strum::{EnumString, EnumVariantNames};

use crate::{datatypes::ArgumentOrder, error::ParseError, graph::GraphBuilder};

/// The supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumVariantNames)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Format {
    /// ASPARTIX facts.
    Apx,
    /// ICCMA 2023 numeric format.
    #[strum(serialize = "iccma", serialize = "af")]
    Iccma,
    /// A JSON [AnalysisRequest][crate::request::AnalysisRequest].
    Json,
}

impl Format {
    /// Guesses the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "apx" | "lp" => Some(Format::Apx),
            "af" | "i23" => Some(Format::Iccma),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fact<'a> {
    Arg(&'a str),
    Att(&'a str, &'a str),
}

/// A parser for the [textual formats][Format] of argumentation frameworks, which yields a [GraphBuilder].
#[derive(Debug, Default, Clone, Copy)]
pub struct AfParser {
    order: ArgumentOrder,
}

impl AfParser {
    /// Creates a parser whose builders use the given [ArgumentOrder].
    pub fn with_order(order: ArgumentOrder) -> Self {
        Self { order }
    }

    /// Parses an ASPARTIX file.
    pub fn parse_apx(&self, input: &str) -> Result<GraphBuilder, ParseError> {
        log::info!("[Start] parsing apx input");
        let mut builder = GraphBuilder::default().with_order(self.order);
        let mut declared = HashSet::new();
        let mut rest = Self::skip(input);
        while !rest.is_empty() {
            match Self::fact(rest) {
                Ok((remain, fact)) => {
                    match fact {
                        Fact::Arg(id) => {
                            if declared.insert(id) {
                                builder.add_id(id);
                            }
                        }
                        Fact::Att(attacker, target) => {
                            builder.add_attack(attacker, target);
                        }
                    }
                    rest = Self::skip(remain);
                }
                Err(_) => {
                    return Err(ParseError {
                        line: line_of(input, rest),
                        message: format!(
                            "expected arg(..). or att(..,..). but found \"{}\"",
                            rest.lines().next().unwrap_or_default().trim_end()
                        ),
                    })
                }
            }
        }
        log::info!(
            "[Done] parsing apx input: {} arguments",
            builder.argument_count()
        );
        Ok(builder)
    }

    /// Parses an ICCMA file.
    pub fn parse_iccma(&self, input: &str) -> Result<GraphBuilder, ParseError> {
        log::info!("[Start] parsing iccma input");
        let mut builder = GraphBuilder::default().with_order(self.order);
        let mut count: Option<usize> = None;
        for (idx, line) in input.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match count {
                None => {
                    let (_, n) = Self::header(trimmed).map_err(|_| ParseError {
                        line: line_no,
                        message: format!("expected header \"p af <n>\" but found \"{}\"", trimmed),
                    })?;
                    for arg in 1..=n {
                        builder.add_id(&arg.to_string());
                    }
                    count = Some(n);
                }
                Some(n) => {
                    let (_, (attacker, target)) =
                        Self::attack(trimmed).map_err(|_| ParseError {
                            line: line_no,
                            message: format!("expected attack \"<i> <j>\" but found \"{}\"", trimmed),
                        })?;
                    for arg in [attacker, target] {
                        if arg == 0 || arg > n {
                            return Err(ParseError {
                                line: line_no,
                                message: format!("argument {} is not in 1..={}", arg, n),
                            });
                        }
                    }
                    builder.add_attack(&attacker.to_string(), &target.to_string());
                }
            }
        }
        if count.is_none() {
            return Err(ParseError {
                line: input.lines().count().max(1),
                message: "missing header \"p af <n>\"".to_string(),
            });
        }
        log::info!(
            "[Done] parsing iccma input: {} arguments",
            builder.argument_count()
        );
        Ok(builder)
    }

    /// Parses `input` in the given textual [Format]; [Format::Json] is handled by [request][crate::request] and rejected here.
    pub fn parse(&self, input: &str, format: Format) -> Result<GraphBuilder, ParseError> {
        match format {
            Format::Apx => self.parse_apx(input),
            Format::Iccma => self.parse_iccma(input),
            Format::Json => Err(ParseError {
                line: 1,
                message: "json input is not a textual framework".to_string(),
            }),
        }
    }
}

impl AfParser {
    fn skip(input: &str) -> &str {
        let result: IResult<&str, Vec<()>> = many0(alt((
            value((), multispace1),
            value((), preceded(char('%'), not_line_ending)),
        )))(input);
        match result {
            Ok((rest, _)) => rest,
            Err(_) => input,
        }
    }

    fn fact(input: &str) -> IResult<&str, Fact> {
        terminated(
            alt((AfParser::arg, AfParser::att)),
            preceded(space0, char('.')),
        )(input)
    }

    fn arg(input: &str) -> IResult<&str, Fact> {
        map(
            preceded(
                tag("arg"),
                delimited(
                    tuple((space0, char('('), space0)),
                    AfParser::id,
                    tuple((space0, char(')'))),
                ),
            ),
            Fact::Arg,
        )(input)
    }

    fn att(input: &str) -> IResult<&str, Fact> {
        map(
            preceded(
                tag("att"),
                delimited(
                    tuple((space0, char('('), space0)),
                    separated_pair(AfParser::id, tuple((space0, char(','), space0)), AfParser::id),
                    tuple((space0, char(')'))),
                ),
            ),
            |(attacker, target)| Fact::Att(attacker, target),
        )(input)
    }

    fn id(input: &str) -> IResult<&str, &str> {
        alt((
            delimited(tag("\""), take_until("\""), tag("\"")),
            take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
        ))(input)
    }

    fn number(input: &str) -> IResult<&str, usize> {
        map_res(digit1, |digits: &str| digits.parse::<usize>())(input)
    }

    fn header(input: &str) -> IResult<&str, usize> {
        all_consuming(preceded(
            tuple((tag("p"), space1, tag("af"), space1)),
            AfParser::number,
        ))(input)
    }

    fn attack(input: &str) -> IResult<&str, (usize, usize)> {
        all_consuming(separated_pair(AfParser::number, space1, AfParser::number))(input)
    }
}

/// The 1-based line of `input` at which `rest` starts; `rest` has to be a suffix of `input`.
fn line_of(input: &str, rest: &str) -> usize {
    let consumed = input.len() - rest.len();
    input[..consumed].matches('\n').count() + 1
}
