use std::io::BufRead;

use clap::ValueEnum;

use crate::error::BucketError;

/// One parsed line of a dump: `"<domain> <title> <views> ..."`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageViewRecord {
    pub domain: String,
    pub title: String,
    pub views: u64,
}

/// What to do with a dump line that has fewer than three fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MalformedLinePolicy {
    /// Count the line and move on
    #[default]
    Skip,
    /// Fail the whole bucket
    Abort,
}

/// Splits on single spaces. Extra fields are ignored and an unparsable
/// view count is read as zero.
pub fn parse_line(line: &str) -> Option<PageViewRecord> {
    let mut fields = line.split(' ');
    let domain = fields.next()?;
    let title = fields.next()?;
    let views = fields.next()?;

    Some(PageViewRecord {
        domain: domain.to_string(),
        title: title.to_string(),
        views: views.parse().unwrap_or(0),
    })
}

/// Lazy, single-pass sequence of records over a decompressed dump stream.
pub struct Records<R> {
    reader: R,
    buf: Vec<u8>,
    policy: MalformedLinePolicy,
    line_number: u64,
    malformed: u64,
    done: bool,
}

impl<R: BufRead> Records<R> {
    pub fn new(reader: R, policy: MalformedLinePolicy) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            policy,
            line_number: 0,
            malformed: 0,
            done: false,
        }
    }

    /// Lines consumed so far, including malformed ones.
    pub fn lines_read(&self) -> u64 {
        self.line_number
    }

    /// Lines skipped under [`MalformedLinePolicy::Skip`].
    pub fn malformed(&self) -> u64 {
        self.malformed
    }
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = Result<PageViewRecord, BucketError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(BucketError::Read(e)));
                }
            }

            self.line_number += 1;
            // Lines that are not valid UTF-8 count as malformed
            if let Ok(raw) = std::str::from_utf8(&self.buf) {
                if let Some(record) = parse_line(raw.trim_end_matches(['\n', '\r'])) {
                    return Some(Ok(record));
                }
            }

            match self.policy {
                MalformedLinePolicy::Skip => self.malformed += 1,
                MalformedLinePolicy::Abort => {
                    self.done = true;
                    let content = String::from_utf8_lossy(&self.buf);
                    return Some(Err(BucketError::MalformedLine {
                        line: self.line_number,
                        content: content.trim_end_matches(['\n', '\r']).to_string(),
                    }));
                }
            }
        }
    }
}
