//! Reader for execution-list dumps written by the vendor's marking software.
//!
//! A dump is line oriented text mixing setting statements such as
//! `n_set_mark_speed(1, 271.68);` with absolute path statements
//! `n_jump_abs(1, -3300, 3300);`. Statements may carry the `n_` card prefix,
//! in which case the first argument is the card number, and the `_list`
//! suffix. Anything that is not a known statement is ignored. A known
//! statement whose arguments cannot be used is reported and skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

use crate::error::{ParseSkipped, Result};
use crate::execution_list::ExecutionListConfig;
use crate::path_command::PathCommand;
use crate::settings::{Field, LaserPulses, ScanaheadLaserShifts,
                      ScanaheadLineParams, ScannerDelays, SkyWritingParams,
                      WobbelMode};

mod parser {
    use nom::IResult;
    use nom::branch::alt;
    use nom::bytes::complete::tag;
    use nom::character::complete::{alpha1, alphanumeric1, char, digit0,
                                   digit1, multispace0};
    use nom::combinator::{all_consuming, map_res, opt, recognize};
    use nom::multi::{many0_count, separated_list0};
    use nom::sequence::{delimited, pair, preceded, tuple};

    type Input<'a> = &'a str;

    fn sign_opt(i: Input) -> IResult<Input, Option<char>>
    {
        opt(alt((char('+'), char('-'))))(i)
    }

    fn fractional_constant(i: Input) -> IResult<Input, Input>
    {
        alt((recognize(tuple((digit0, char('.'), digit1))),
             recognize(pair(digit1, char('.')))))(i)
    }

    fn exponent(i: Input) -> IResult<Input, Input>
    {
        recognize(tuple((alt((char('e'), char('E'))), sign_opt, digit1)))(i)
    }

    fn floating_point_constant(i: Input) -> IResult<Input, Input>
    {
        alt((recognize(pair(fractional_constant, opt(exponent))),
             recognize(pair(digit1, exponent))))(i)
    }

    pub fn number(i: Input) -> IResult<Input, f64>
    {
        map_res(alt((recognize(pair(sign_opt, floating_point_constant)),
                     recognize(pair(sign_opt, digit1)))),
                |s: Input| s.parse::<f64>())(i)
    }

    fn comma_wsp(i: Input) -> IResult<Input, Input>
    {
        recognize(tuple((multispace0, char(','), multispace0)))(i)
    }

    pub fn number_list(i: Input) -> IResult<Input, Vec<f64>>
    {
        all_consuming(delimited(multispace0,
                                separated_list0(comma_wsp, number),
                                multispace0))(i)
    }

    fn identifier(i: Input) -> IResult<Input, Input>
    {
        recognize(pair(alt((alpha1, tag("_"))),
                       many0_count(alt((alphanumeric1, tag("_"))))))(i)
    }

    /// `name (` with the open parenthesis consumed.
    pub fn call_head(i: Input) -> IResult<Input, Input>
    {
        let (rest, name) = identifier(i)?;
        let (rest, _) = preceded(multispace0, char('('))(rest)?;
        Ok((rest, name))
    }

    pub fn skip_identifier(i: Input) -> IResult<Input, Input>
    {
        identifier(i)
    }

    pub fn calibration_value(i: Input) -> IResult<Input, f64>
    {
        preceded(tuple((multispace0, char(':'), multispace0)), number)(i)
    }
}

const CALIBRATION_MARKER: &str = "Calibration Factor";

/// Parses a comma separated list of numbers, `None` unless the whole
/// string is such a list.
pub fn parse_number_list(s: &str) -> Option<Vec<f64>>
{
    match parser::number_list(s) {
        Ok((_, v)) => Some(v),
        Err(_) => None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionList
{
    pub config: ExecutionListConfig,
    pub commands: Vec<PathCommand>,
    pub skipped: Vec<ParseSkipped>
}

#[derive(Debug, Clone, Copy)]
enum Statement
{
    Jump,
    Mark,
    Arc,
    Angle,
    MarkSpeed,
    JumpSpeed,
    ScanaheadAutodelays,
    ScanaheadLaserShifts,
    ScanaheadLineParams,
    FirstPulseKiller,
    LaserPulses,
    WobbelMode,
    SkyWritingPara,
    SkyWritingMode,
    ScannerDelays
}

fn lookup_statement(base: &str) -> Option<Statement>
{
    let s = match base {
        "jump_abs" => Statement::Jump,
        "mark_abs" => Statement::Mark,
        "arc_abs" => Statement::Arc,
        "set_angle" => Statement::Angle,
        "set_mark_speed" => Statement::MarkSpeed,
        "set_jump_speed" => Statement::JumpSpeed,
        "activate_scanahead_autodelays" => Statement::ScanaheadAutodelays,
        "set_scanahead_laser_shifts" => Statement::ScanaheadLaserShifts,
        "set_scanahead_line_params" => Statement::ScanaheadLineParams,
        "set_firstpulse_killer" => Statement::FirstPulseKiller,
        "set_laser_pulses" => Statement::LaserPulses,
        "set_wobbel_mode" => Statement::WobbelMode,
        "set_sky_writing_para" => Statement::SkyWritingPara,
        "set_sky_writing_mode" => Statement::SkyWritingMode,
        "set_scanner_delays" => Statement::ScannerDelays,
        _ => return None
    };
    Some(s)
}

// Returns the statement and whether it carries a card number
fn classify(name: &str) -> Option<(Statement, bool)>
{
    let (base, card) = match name.strip_prefix("n_") {
        Some(rest) => (rest, true),
        None => (name, false)
    };
    let base = base.strip_suffix("_list").unwrap_or(base);
    lookup_statement(base).map(|s| (s, card))
}

fn expect_args(args: &[f64], n: usize) -> std::result::Result<(), String>
{
    if args.len() != n {
        Err(format!("expected {} arguments, got {}", n, args.len()))
    } else {
        Ok(())
    }
}

fn field<T: Field>(v: f64) -> std::result::Result<T, String>
{
    T::from_f64(v).ok_or_else(|| format!("argument {} out of range", v))
}

fn point_args(args: &[f64]) -> std::result::Result<(i32, i32), String>
{
    Ok((field(args[0])?, field(args[1])?))
}

fn apply_statement(stmt: Statement, args: &[f64],
                   config: &mut ExecutionListConfig,
                   commands: &mut Vec<PathCommand>)
                   -> std::result::Result<(), String>
{
    match stmt {
        Statement::Jump => {
            expect_args(args, 2)?;
            let (x, y) = point_args(args)?;
            commands.push(PathCommand::jump(x, y));
        },
        Statement::Mark => {
            expect_args(args, 2)?;
            let (x, y) = point_args(args)?;
            commands.push(PathCommand::line(x, y));
        },
        Statement::Arc => {
            expect_args(args, 3)?;
            let (x, y) = point_args(args)?;
            commands.push(PathCommand::arc(x, y, field(args[2])?));
        },
        Statement::Angle => {
            // head, angle, at_once
            expect_args(args, 3)?;
            config.beam_angle = field(args[1])?;
        },
        Statement::MarkSpeed => {
            expect_args(args, 1)?;
            config.mark_speed = field(args[0])?;
        },
        Statement::JumpSpeed => {
            expect_args(args, 1)?;
            config.jump_speed = field(args[0])?;
        },
        Statement::ScanaheadAutodelays => {
            expect_args(args, 1)?;
            config.scanahead_autodelays = field::<i32>(args[0])? != 0;
        },
        Statement::FirstPulseKiller => {
            expect_args(args, 1)?;
            config.first_pulse_killer = field(args[0])?;
        },
        Statement::SkyWritingMode => {
            expect_args(args, 1)?;
            config.sky_writing_mode = field(args[0])?;
        },
        Statement::ScanaheadLaserShifts => {
            config.scanahead_laser_shifts =
                ScanaheadLaserShifts::from_args(args).map_err(|e| e.to_string())?;
        },
        Statement::ScanaheadLineParams => {
            config.scanahead_line_params =
                ScanaheadLineParams::from_args(args).map_err(|e| e.to_string())?;
        },
        Statement::LaserPulses => {
            config.laser_pulses =
                LaserPulses::from_args(args).map_err(|e| e.to_string())?;
        },
        Statement::WobbelMode => {
            config.wobbel_mode =
                WobbelMode::from_args(args).map_err(|e| e.to_string())?;
        },
        Statement::SkyWritingPara => {
            config.sky_writing_params =
                SkyWritingParams::from_args(args).map_err(|e| e.to_string())?;
        },
        Statement::ScannerDelays => {
            config.scanner_delays =
                ScannerDelays::from_args(args).map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

struct ListBuilder
{
    config: ExecutionListConfig,
    commands: Vec<PathCommand>,
    skipped: Vec<ParseSkipped>
}

impl ListBuilder
{
    fn skip(&mut self, line: usize, statement: &str, reason: String)
    {
        let s = ParseSkipped {
            line,
            statement: statement.to_string(),
            reason
        };
        warn!("{}", s);
        self.skipped.push(s);
    }

    fn calibration(&mut self, line_no: usize, line: &str)
    {
        if let Some(pos) = line.find(CALIBRATION_MARKER) {
            let rest = &line[pos + CALIBRATION_MARKER.len()..];
            match parser::calibration_value(rest) {
                Ok((_, v)) if v.is_finite() => self.config.calibration_factor = v,
                _ => self.skip(line_no, CALIBRATION_MARKER,
                               "no numeric value after marker".to_string())
            }
        }
    }

    fn statement(&mut self, line_no: usize, name: &str, args: Option<&str>)
    {
        let (stmt, card) = match classify(name) {
            Some(s) => s,
            None => return
        };
        let args = match args.and_then(parse_number_list) {
            Some(args) => args,
            None => {
                self.skip(line_no, name, "malformed argument list".to_string());
                return
            }
        };
        let args = if card {
            match args.split_first() {
                Some((_card_no, rest)) => rest,
                None => {
                    self.skip(line_no, name, "missing card number".to_string());
                    return
                }
            }
        } else {
            &args[..]
        };
        debug!("line {}: {} {:?}", line_no, name, args);
        if let Err(reason) = apply_statement(stmt, args, &mut self.config,
                                             &mut self.commands) {
            self.skip(line_no, name, reason);
        }
    }

    fn line(&mut self, line_no: usize, line: &str)
    {
        // Exports put the calibration marker in the comment header
        self.calibration(line_no, line);
        let mut rest = match line.find("//") {
            Some(pos) => &line[..pos],
            None => line
        };
        while !rest.is_empty() {
            if let Ok((after_paren, name)) = parser::call_head(rest) {
                match after_paren.find(')') {
                    Some(end) => {
                        self.statement(line_no, name, Some(&after_paren[..end]));
                        rest = &after_paren[end + 1..];
                    },
                    None => {
                        self.statement(line_no, name, None);
                        rest = "";
                    }
                }
            } else if let Ok((r, _)) = parser::skip_identifier(rest) {
                rest = r;
            } else {
                let n = rest.chars().next().map_or(1, |c| c.len_utf8());
                rest = &rest[n..];
            }
        }
    }
}

/// Parses the text of an execution list. Never fails; statements that
/// cannot be used are listed in `skipped`.
pub fn parse_execution_list(text: &str) -> ExecutionList
{
    let mut builder = ListBuilder {
        config: ExecutionListConfig::default(),
        commands: Vec::new(),
        skipped: Vec::new()
    };
    for (i, line) in text.lines().enumerate() {
        builder.line(i + 1, line);
    }
    debug!("Parsed {} path commands, skipped {} statements",
           builder.commands.len(), builder.skipped.len());
    ExecutionList {
        config: builder.config,
        commands: builder.commands,
        skipped: builder.skipped
    }
}

pub fn read_execution_list<R: Read>(mut input: R) -> Result<ExecutionList>
{
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    Ok(parse_execution_list(&text))
}

pub fn load_execution_list(path: &Path) -> Result<ExecutionList>
{
    let file = File::open(path)?;
    read_execution_list(file)
}

#[test]
fn test_number()
{
    assert_eq!(parser::number("271.68"), Ok(("", 271.68)));
    assert_eq!(parser::number("-50)"), Ok((")", -50.0)));
    assert_eq!(parser::number("+1.2e3"), Ok(("", 1200.0)));
    assert_eq!(parser::number("5."), Ok(("", 5.0)));
    assert_eq!(parser::number(".5"), Ok(("", 0.5)));
    assert!(parser::number("x1").is_err());
}

#[test]
fn test_number_list()
{
    assert_eq!(parse_number_list("1, 100, -50"), Some(vec![1.0, 100.0, -50.0]));
    assert_eq!(parse_number_list("  "), Some(vec![]));
    assert_eq!(parse_number_list("1,,2"), None);
    assert_eq!(parse_number_list("1 2"), None);
}

#[test]
fn test_classify()
{
    assert!(matches!(classify("n_mark_abs"), Some((Statement::Mark, true))));
    assert!(matches!(classify("set_sky_writing_para_list"),
                     Some((Statement::SkyWritingPara, false))));
    assert!(matches!(classify("n_set_angle_list"), Some((Statement::Angle, true))));
    assert!(classify("n_get_status").is_none());
    assert!(classify("mark_rel").is_none());
}
