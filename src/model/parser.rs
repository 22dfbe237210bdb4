use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};

use super::description::{Face, MeshDescription, MeshSource, SubmeshRange};
use super::ModelVertex;
use crate::error::{Block, FormatErrorKind, MeshError, Result};

// Upper bound on up-front reservation so a corrupt count can't request
// gigabytes before the first line is read.
const MAX_PREALLOC: usize = 1 << 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject files whose groups leave faces undrawn or draw them twice.
    pub require_full_coverage: bool,
}

/// Loads a `.model` file from disk.
pub fn load<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<MeshDescription> {
    let path = path.as_ref();
    let file = File::open(path)?;
    debug!("Parsing mesh file {}", path.display());
    parse_with(
        BufReader::new(file),
        MeshSource::File(path.to_path_buf()),
        options,
    )
}

/// Parses mesh data from any buffered reader with default options.
pub fn parse<R: BufRead>(reader: R) -> Result<MeshDescription> {
    parse_with(reader, MeshSource::Stream, ParseOptions::default())
}

pub fn parse_str(source: &str) -> Result<MeshDescription> {
    parse(source.as_bytes())
}

pub fn parse_with<R: BufRead>(
    reader: R,
    source: MeshSource,
    options: ParseOptions,
) -> Result<MeshDescription> {
    let mut lines = LineReader::new(reader);

    let vertex_count = lines.read_count(Block::Vertices)?;
    let mut vertices = Vec::with_capacity((vertex_count as usize).min(MAX_PREALLOC));
    for _ in 0..vertex_count {
        let line = lines.expect_line()?;
        vertices.push(parse_vertex(&line).map_err(|kind| lines.error(kind))?);
    }

    let face_count = lines.read_count(Block::Faces)?;
    if face_count.checked_mul(3).is_none() {
        return Err(lines.error(FormatErrorKind::InvalidCount {
            block: Block::Faces,
            token: face_count.to_string(),
        }));
    }
    let mut faces: Vec<Face> = Vec::with_capacity((face_count as usize).min(MAX_PREALLOC));
    for _ in 0..face_count {
        let line = lines.expect_line()?;
        faces.push(parse_face(&line, vertex_count).map_err(|kind| lines.error(kind))?);
    }

    let group_count = lines.read_count(Block::Groups)?;
    let mut submeshes = Vec::with_capacity((group_count as usize).min(MAX_PREALLOC));
    for _ in 0..group_count {
        let line = lines.expect_line()?;
        submeshes.push(parse_group(&line, face_count).map_err(|kind| lines.error(kind))?);
    }

    lines.warn_on_trailing()?;

    debug!(
        "Parsed mesh: {} vertices, {} faces, {} groups",
        vertices.len(),
        faces.len(),
        submeshes.len()
    );

    let mesh = MeshDescription::from_validated(vertices, faces, submeshes, source);
    if options.require_full_coverage {
        mesh.check_coverage()?;
    }
    Ok(mesh)
}

struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    /// Next line without its terminator. Bytes that are not UTF-8 are a
    /// format error on that line, not an I/O failure.
    fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        match std::str::from_utf8(&self.buf) {
            Ok(line) => Ok(Some(line.to_string())),
            Err(err) => Err(self.error(FormatErrorKind::InvalidEncoding {
                offset: err.valid_up_to(),
            })),
        }
    }

    /// Next line inside a counted block; running out of input there is
    /// reported against the line that should have followed.
    fn expect_line(&mut self) -> Result<String> {
        match self.next_line()? {
            Some(line) => Ok(line),
            None => {
                self.line_no += 1;
                Ok(String::new())
            }
        }
    }

    fn read_count(&mut self, block: Block) -> Result<u32> {
        let Some(line) = self.next_line()? else {
            return Err(MeshError::format(
                self.line_no + 1,
                FormatErrorKind::MissingCount(block),
            ));
        };
        let token = line.trim();
        if token.is_empty() {
            return Err(self.error(FormatErrorKind::MissingCount(block)));
        }
        token.parse::<u32>().map_err(|_| {
            self.error(FormatErrorKind::InvalidCount {
                block,
                token: token.to_string(),
            })
        })
    }

    fn warn_on_trailing(&mut self) -> Result<()> {
        while let Some(line) = self.next_line()? {
            if !line.trim().is_empty() {
                warn!(
                    "Ignoring content after group block starting at line {}",
                    self.line_no
                );
                break;
            }
        }
        Ok(())
    }

    fn error(&self, kind: FormatErrorKind) -> MeshError {
        MeshError::format(self.line_no, kind)
    }
}

fn parse_vertex(line: &str) -> std::result::Result<ModelVertex, FormatErrorKind> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != ModelVertex::STRIDE {
        return Err(FormatErrorKind::VertexArity(tokens.len()));
    }

    let mut values = [0.0f32; 8];
    for (value, token) in values.iter_mut().zip(&tokens) {
        *value = token
            .parse()
            .map_err(|_| FormatErrorKind::InvalidFloat(token.to_string()))?;
    }
    Ok(ModelVertex::from_floats(values))
}

fn parse_face(line: &str, vertex_count: u32) -> std::result::Result<Face, FormatErrorKind> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(FormatErrorKind::FaceArity(tokens.len()));
    }

    let mut face = [0u32; 3];
    for (index, token) in face.iter_mut().zip(&tokens) {
        *index = token
            .parse()
            .map_err(|_| FormatErrorKind::InvalidIndex(token.to_string()))?;
        if *index >= vertex_count {
            return Err(FormatErrorKind::IndexOutOfRange {
                index: *index,
                vertex_count,
            });
        }
    }
    Ok(face)
}

/// `<start> <end> <name>`, where the name is ASCII letters, digits and spaces.
fn parse_group(line: &str, face_count: u32) -> std::result::Result<SubmeshRange, FormatErrorKind> {
    let trimmed = line.trim();
    let malformed = || FormatErrorKind::MalformedGroup(trimmed.to_string());

    let (start, rest) = trimmed.split_once(' ').ok_or_else(malformed)?;
    let (end, name) = rest.split_once(' ').ok_or_else(malformed)?;
    let start: u32 = parse_group_bound(start).ok_or_else(malformed)?;
    let end: u32 = parse_group_bound(end).ok_or_else(malformed)?;

    let valid_name = !name.trim().is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ');
    if !valid_name {
        return Err(malformed());
    }

    if start > end || end > face_count {
        return Err(FormatErrorKind::GroupOutOfRange {
            name: name.to_string(),
            start,
            end,
            face_count,
        });
    }

    Ok(SubmeshRange::new(name, start, end))
}

fn parse_group_bound(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}
