use nom::{
    IResult,
    branch::alt,
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{all_consuming, map_opt, map_res, opt},
    multi::separated_list1,
    sequence::{delimited, preceded, terminated},
};
use ringbuf_core::{Format, Shape};

use crate::{IoError, Result};

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn dim(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

/// `(2048, 2)` or `(4096,)`
fn tuple_dims(input: &str) -> IResult<&str, Vec<usize>> {
    delimited(
        char('('),
        terminated(separated_list1(char(','), ws(dim)), opt(char(','))),
        preceded(multispace0, char(')')),
    )(input)
}

/// `4096` or `2048x2`
fn bare_dims(input: &str) -> IResult<&str, Vec<usize>> {
    separated_list1(one_of("xX*"), ws(dim))(input)
}

fn format_tag(input: &str) -> IResult<&str, Format> {
    preceded(opt(one_of("@=")), map_opt(one_of("bBhHiIlLqQfd"), Format::from_tag))(input)
}

/// Parses a one- or two-dimensional shape descriptor.
pub fn parse_shape(input: &str) -> Result<Shape> {
    let (_, dims) = all_consuming(ws(alt((tuple_dims, bare_dims))))(input).map_err(|_| {
        IoError::Parse {
            what: "shape",
            input: input.to_owned(),
        }
    })?;
    Ok(Shape::from_dims(&dims)?)
}

/// Parses a format tag such as `h` or `=d`.
pub fn parse_format(input: &str) -> Result<Format> {
    let (_, format) = all_consuming(ws(format_tag))(input).map_err(|_| IoError::Parse {
        what: "format",
        input: input.to_owned(),
    })?;
    Ok(format)
}
