use crate::error::PdfError;
use crate::objects::{ObjRef, PdfDict, PdfValue};
use crate::source::ByteFeed;
use crate::tokenizer::{Token, Tokenizer};

/// Which delimiter opened the container on the stack.
enum Container {
    Dict(Vec<PdfValue>),
    Array(Vec<PdfValue>),
}

/// Assembles tokens into exactly one composite value.
pub struct ObjectParser<F: ByteFeed> {
    tokenizer: Tokenizer<F>,
}

impl<F: ByteFeed> ObjectParser<F> {
    pub fn new(feed: F) -> Self {
        ObjectParser {
            tokenizer: Tokenizer::new(feed),
        }
    }

    /// Parse one value. Containers nest through an explicit stack; the
    /// parse completes when a value finishes with the stack empty.
    pub fn parse(&mut self) -> Result<PdfValue, PdfError> {
        let mut stack: Vec<Container> = Vec::new();
        loop {
            let token = self
                .tokenizer
                .next_token()?
                .ok_or(PdfError::UnexpectedEof)?;
            let completed = match token {
                Token::OpenDict => {
                    stack.push(Container::Dict(Vec::new()));
                    continue;
                }
                Token::OpenArray => {
                    stack.push(Container::Array(Vec::new()));
                    continue;
                }
                Token::CloseDict => match stack.pop() {
                    Some(Container::Dict(items)) => build_dict(items)?,
                    _ => {
                        return Err(PdfError::MalformedObject(
                            "unmatched >>".to_string(),
                        ))
                    }
                },
                Token::CloseArray => match stack.pop() {
                    Some(Container::Array(items)) => PdfValue::Array(items),
                    _ => {
                        return Err(PdfError::MalformedObject(
                            "unmatched ]".to_string(),
                        ))
                    }
                },
                Token::Name(bytes) => PdfValue::Name(bytes),
                Token::String(bytes) => PdfValue::String(bytes),
                Token::Number(number) => {
                    if number.is_real() {
                        PdfValue::Real(number.as_f64())
                    } else {
                        PdfValue::Integer(number.as_i64().ok_or_else(|| {
                            PdfError::MalformedObject(format!(
                                "bad integer {}",
                                String::from_utf8_lossy(number.bytes())
                            ))
                        })?)
                    }
                }
                Token::Word(word) => match word.as_slice() {
                    b"true" => PdfValue::Boolean(true),
                    b"false" => PdfValue::Boolean(false),
                    b"null" => PdfValue::Null,
                    b"R" => pop_reference(&mut stack)?,
                    other => {
                        return Err(PdfError::MalformedObject(format!(
                            "unexpected keyword {}",
                            String::from_utf8_lossy(other)
                        )))
                    }
                },
            };
            match stack.last_mut() {
                Some(Container::Dict(items)) | Some(Container::Array(items)) => {
                    items.push(completed)
                }
                None => return Ok(completed),
            }
        }
    }
}

/// Entries arrive as a flat `name value name value …` run.
fn build_dict(items: Vec<PdfValue>) -> Result<PdfValue, PdfError> {
    if items.len() % 2 != 0 {
        return Err(PdfError::MalformedObject(
            "dictionary with odd entry count".to_string(),
        ));
    }
    let mut dict = PdfDict::new();
    let mut items = items.into_iter();
    while let (Some(key), Some(value)) = (items.next(), items.next()) {
        match key {
            PdfValue::Name(bytes) => dict.insert(bytes, value),
            other => {
                return Err(PdfError::MalformedObject(format!(
                    "dictionary key is not a name: {:?}",
                    other
                )))
            }
        }
    }
    Ok(PdfValue::Dict(dict))
}

/// `R` replaces the two numbers before it with an indirect reference.
fn pop_reference(stack: &mut [Container]) -> Result<PdfValue, PdfError> {
    let items = match stack.last_mut() {
        Some(Container::Dict(items)) | Some(Container::Array(items)) => items,
        None => {
            return Err(PdfError::MalformedObject(
                "R outside of a container".to_string(),
            ))
        }
    };
    let gen = items.pop();
    let num = items.pop();
    match (num, gen) {
        (Some(PdfValue::Integer(num)), Some(PdfValue::Integer(gen)))
            if num >= 0 && (0..=i64::from(u16::MAX)).contains(&gen) =>
        {
            Ok(PdfValue::Reference(ObjRef(num as u32, gen as u16)))
        }
        (num, gen) => Err(PdfError::MalformedObject(format!(
            "bad indirect reference operands: {:?} {:?}",
            num, gen
        ))),
    }
}
