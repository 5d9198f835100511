//! Line-oriented Matrix Market coordinate parser
//!
//! Only the coordinate format with general symmetry is accepted. Indices
//! in the file are 1-based and reported 0-based.

use std::io::BufRead;

use layered_core::MatrixElement;

use crate::error::{Error, Result};

/// Value field declared in the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Integer,
    Real,
    Double,
    Complex,
    Pattern,
}

impl Field {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "integer" => Some(Field::Integer),
            "real" => Some(Field::Real),
            "double" => Some(Field::Double),
            "complex" => Some(Field::Complex),
            "pattern" => Some(Field::Pattern),
            _ => None,
        }
    }

    /// Whether entries carry a single real or integer value
    pub fn is_numeric(&self) -> bool {
        matches!(self, Field::Integer | Field::Real | Field::Double)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Integer => "integer",
            Field::Real => "real",
            Field::Double => "double",
            Field::Complex => "complex",
            Field::Pattern => "pattern",
        };
        write!(f, "{name}")
    }
}

/// Parsed `%%MatrixMarket` header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub object: String,
    pub format: String,
    pub field: Field,
    pub symmetry: String,
}

/// Streaming parser over a buffered reader
pub struct MatrixMarketParser<R> {
    reader: R,
    line: usize,
    buffer: String,
    banner: Option<Banner>,
    size: Option<(usize, usize, usize)>,
}

impl<R: BufRead> MatrixMarketParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buffer: String::new(),
            banner: None,
            size: None,
        }
    }

    /// Read the next line into the buffer; false at end of input
    fn next_line(&mut self) -> Result<bool> {
        self.buffer.clear();
        let read = self
            .reader
            .read_line(&mut self.buffer)
            .map_err(|e| Error::io(None, e))?;
        if read == 0 {
            return Ok(false);
        }
        self.line += 1;
        Ok(true)
    }

    /// Read the banner, skip comments and read the size line
    pub fn scan_preamble(&mut self) -> Result<()> {
        if !self.next_line()? {
            return Err(Error::parse(1, "empty input, expected a %%MatrixMarket banner"));
        }
        let banner = parse_banner(self.buffer.trim_end(), self.line)?;
        if banner.object != "matrix" {
            return Err(Error::unsupported(self.line, format!("object '{}'", banner.object)));
        }
        if banner.format != "coordinate" {
            return Err(Error::unsupported(self.line, format!("format '{}'", banner.format)));
        }
        if banner.symmetry != "general" {
            return Err(Error::unsupported(self.line, format!("symmetry '{}'", banner.symmetry)));
        }
        self.banner = Some(banner);

        loop {
            if !self.next_line()? {
                return Err(Error::parse(self.line + 1, "missing size line"));
            }
            let text = self.buffer.trim();
            if text.is_empty() || text.starts_with('%') {
                continue;
            }

            let fields: Vec<&str> = text.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(Error::parse(self.line, "size line should contain three integers"));
            }
            let mut dims = [0usize; 3];
            for (slot, token) in dims.iter_mut().zip(&fields) {
                *slot = token
                    .parse()
                    .map_err(|_| Error::parse(self.line, format!("invalid size '{token}'")))?;
            }
            self.size = Some((dims[0], dims[1], dims[2]));
            return Ok(());
        }
    }

    /// Number of lines consumed so far
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Declared (rows, columns, entries); available after [`Self::scan_preamble`]
    pub fn size(&self) -> Option<(usize, usize, usize)> {
        self.size
    }

    /// Visit every entry as (row, column, count) with 0-based indices
    ///
    /// Values are validated as non-negative counts; the number of entries
    /// must match the size line. Core errors returned by `handler` are
    /// reported with the entry's line number.
    pub fn scan_triplets<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(usize, usize, u64) -> Result<()>,
    {
        let (field, (nrow, ncol, nnz)) = match (&self.banner, self.size) {
            (Some(banner), Some(size)) => (banner.field, size),
            _ => return Err(Error::parse(self.line, "preamble has not been scanned")),
        };
        if !field.is_numeric() {
            return Err(Error::NonNumericField(field.to_string()));
        }

        let mut seen = 0usize;
        while self.next_line()? {
            let text = self.buffer.trim();
            if text.is_empty() || text.starts_with('%') {
                continue;
            }
            if seen == nnz {
                return Err(Error::parse(self.line, format!("more than {nnz} entries")));
            }

            let mut tokens = text.split_whitespace();
            let (Some(r), Some(c), Some(v), None) =
                (tokens.next(), tokens.next(), tokens.next(), tokens.next())
            else {
                return Err(Error::parse(self.line, "entry should contain row, column and value"));
            };

            let row = parse_index(r, nrow, self.line, "row")?;
            let col = parse_index(c, ncol, self.line, "column")?;
            let line = self.line;
            let count = match field {
                Field::Integer => v
                    .parse::<i64>()
                    .map_err(|_| Error::parse(line, format!("invalid integer '{v}'")))?
                    .to_count(),
                _ => v
                    .parse::<f64>()
                    .map_err(|_| Error::parse(line, format!("invalid real '{v}'")))?
                    .to_count(),
            }
            .map_err(|source| Error::InvalidValue { line, source })?;

            handler(row, col, count).map_err(|e| e.at_line(line))?;
            seen += 1;
        }

        if seen != nnz {
            return Err(Error::parse(
                self.line,
                format!("expected {nnz} entries, found {seen}"),
            ));
        }
        Ok(())
    }
}

fn parse_banner(text: &str, line: usize) -> Result<Banner> {
    let mut tokens = text.split_whitespace();
    if tokens.next() != Some("%%MatrixMarket") {
        return Err(Error::parse(line, "expected a %%MatrixMarket banner"));
    }
    let lowered: Vec<String> = tokens.map(str::to_ascii_lowercase).collect();
    let [object, format, field, symmetry] = lowered.as_slice() else {
        return Err(Error::parse(line, "banner should name object, format, field and symmetry"));
    };
    let field = Field::parse(field)
        .ok_or_else(|| Error::parse(line, format!("unknown field '{field}'")))?;

    Ok(Banner {
        object: object.clone(),
        format: format.clone(),
        field,
        symmetry: symmetry.clone(),
    })
}

fn parse_index(token: &str, extent: usize, line: usize, what: &str) -> Result<usize> {
    let index: usize = token
        .parse()
        .map_err(|_| Error::parse(line, format!("invalid {what} index '{token}'")))?;
    if index == 0 || index > extent {
        return Err(Error::parse(
            line,
            format!("{what} index {index} is outside 1..={extent}"),
        ));
    }
    Ok(index - 1)
}
