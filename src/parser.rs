//! The main spec parser: a registry of section readers and the loop that
//! hands them the input.

use std::sync::Arc;

use crate::context::{Location, Source};
use crate::error::{quoted, ParseError};
use crate::lexer::Lexer;
use crate::reader::{Instruction, LinesAutomaton, Reader, SectionMatch};

pub struct Parser {
    readers: Vec<Box<dyn Reader>>,
}

impl Parser {
    /// A parser understanding the default section set.
    pub fn new() -> Self {
        Self {
            readers: crate::sections::default_readers(),
        }
    }

    /// A parser with no readers at all, for fully custom spec dialects.
    pub fn empty() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Make the parser understand a new section type.
    pub fn add_reader(&mut self, reader: Box<dyn Reader>) {
        self.readers.push(reader);
    }

    /// Forget section types by reader name.
    pub fn remove_readers(&mut self, name: &str) {
        self.readers.retain(|r| r.name() != name);
    }

    /// Parse a whole spec source into the instruction sequence it declares.
    pub fn parse_str(
        &self,
        input: &str,
        source: Arc<Source>,
    ) -> Result<Vec<Instruction>, ParseError> {
        let mut lexer = Lexer::new(input, source);
        self.parse(&mut lexer)
    }

    /// Read and parse a spec file; `included_from` chains diagnostics up to
    /// the including site.
    pub fn parse_file(
        &self,
        name: &str,
        path: &std::path::Path,
        included_from: Option<Location>,
    ) -> Result<Vec<Instruction>, ParseError> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_owned());
        let raw = std::fs::read_to_string(&canonical).map_err(|e| {
            let at = included_from
                .clone()
                .unwrap_or_else(|| Location::anonymous(name));
            ParseError::new(
                format!("Could not read spec file {}: {}.", quoted(name), e),
                at,
            )
        })?;
        let input: String = normalize_line_endings::normalized(raw.chars()).collect();
        let source = Source::file(name, canonical, included_from);
        self.parse_str(&input, source)
    }

    pub(crate) fn parse(&self, lexer: &mut Lexer<'_>) -> Result<Vec<Instruction>, ParseError> {
        let mut collected = Vec::new();
        let mut pending: Option<Box<dyn LinesAutomaton>> = None;
        loop {
            if lexer.is_consumed() {
                if let Some(automaton) = pending.take() {
                    collected.push(automaton.terminate()?);
                }
                break;
            }
            match self.find_matching_reader(lexer)? {
                Some(matched) => {
                    if let Some(automaton) = pending.take() {
                        collected.push(automaton.terminate()?);
                    }
                    match matched {
                        SectionMatch::Hard(instruction) => collected.push(instruction),
                        SectionMatch::Soft(automaton) => pending = Some(automaton),
                        SectionMatch::NoMatch => unreachable!("filtered by find_matching_reader"),
                    }
                }
                None => {
                    if let Some(automaton) = pending.as_mut() {
                        // Extract only one line to feed the automaton with.
                        let mut line = lexer.split_line();
                        automaton.feed(&mut line)?;
                    } else if lexer.find_empty_line() {
                        // Blank or pure-comment line between sections.
                    } else {
                        return Err(lexer.error("No readers matching input."));
                    }
                }
            }
        }
        Ok(collected)
    }

    /// Offer the current position to every reader; exactly one may take it.
    fn find_matching_reader(
        &self,
        lexer: &mut Lexer<'_>,
    ) -> Result<Option<SectionMatch>, ParseError> {
        let mut matches: Vec<(SectionMatch, &'static str, Lexer<'_>)> = Vec::new();
        for reader in &self.readers {
            let mut probe = lexer.clone();
            match reader.section_match(&mut probe)? {
                SectionMatch::NoMatch => {}
                matched => matches.push((matched, reader.name(), probe)),
            }
        }
        if matches.len() > 1 {
            let names: Vec<_> = matches.iter().map(|(_, name, _)| *name).collect();
            let listed = if names.len() == 2 {
                format!("both readers {} and {}", names[0], names[1])
            } else {
                format!(
                    "all readers {} and {}",
                    names[..names.len() - 1].join(", "),
                    names[names.len() - 1]
                )
            };
            return Err(lexer.error(format!("Ambiguity: {} match.", listed)));
        }
        match matches.pop() {
            Some((matched, _, winner)) => {
                *lexer = winner;
                Ok(Some(matched))
            }
            None => Ok(None),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
