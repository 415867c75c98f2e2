use crate::domain::model::Order;
use crate::utils::error::{Result, StatError};
use serde::de::Error as _;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 記錄目前讀到第幾個 byte，用於錯誤訊息
struct CountingReader<R> {
    inner: R,
    offset: u64,
}

impl<R> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.offset += n as u64;
        Ok(n)
    }
}

impl<R: BufRead> BufRead for CountingReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
        self.offset += amt as u64;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Detect,
    Array { first: bool },
    AfterArray,
    Sequence,
    Finished,
}

/// 逐筆解碼單一檔案中的訂單
///
/// 支援兩種格式：最外層為 JSON 陣列，或以空白/換行分隔的多個訂單物件。
/// 記憶體用量只與單筆訂單大小有關。遇到第一個錯誤後不再產生任何資料。
pub struct OrderStream<R> {
    reader: CountingReader<R>,
    path: PathBuf,
    framing: Framing,
    record: u64,
    record_offset: u64,
}

impl OrderStream<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| StatError::FileAccessError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> OrderStream<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader: CountingReader::new(reader),
            path: path.into(),
            framing: Framing::Detect,
            record: 0,
            record_offset: 0,
        }
    }

    /// 目前為止成功解碼的訂單數
    pub fn records_read(&self) -> u64 {
        self.record
    }

    // 略過 JSON 空白並回傳下一個 byte (不消耗)
    fn peek_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            let (skip, next) = {
                let buf = self.reader.fill_buf()?;
                if buf.is_empty() {
                    self.record_offset = self.reader.offset;
                    return Ok(None);
                }
                let skip = buf
                    .iter()
                    .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
                    .count();
                (skip, buf.get(skip).copied())
            };
            self.reader.consume(skip);
            if let Some(byte) = next {
                self.record_offset = self.reader.offset;
                return Ok(Some(byte));
            }
        }
    }

    fn skip_bom(&mut self) -> io::Result<()> {
        if self.reader.fill_buf()?.starts_with(UTF8_BOM) {
            self.reader.consume(UTF8_BOM.len());
        }
        Ok(())
    }

    fn decode_one(&mut self) -> serde_json::Result<Order> {
        // 每筆使用新的 Deserializer；訂單是物件，結尾 `}` 之後不會多讀
        let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
        Order::deserialize(&mut de)
    }

    fn next_record(&mut self) -> serde_json::Result<Option<Order>> {
        if self.framing == Framing::Detect {
            self.skip_bom().map_err(serde_json::Error::custom)?;
        }
        loop {
            let next = self.peek_byte().map_err(serde_json::Error::custom)?;
            match (self.framing, next) {
                (Framing::Finished, _) => return Ok(None),
                (Framing::Detect, None) => {
                    self.framing = Framing::Finished;
                    return Ok(None);
                }
                (Framing::Detect, Some(b'[')) => {
                    self.reader.consume(1);
                    self.framing = Framing::Array { first: true };
                }
                (Framing::Detect, Some(_)) => self.framing = Framing::Sequence,
                (Framing::Array { .. }, None) => {
                    return Err(serde_json::Error::custom("EOF while parsing a list"));
                }
                (Framing::Array { .. }, Some(b']')) => {
                    self.reader.consume(1);
                    self.framing = Framing::AfterArray;
                }
                (Framing::Array { first: false }, Some(b',')) => {
                    self.reader.consume(1);
                    self.peek_byte().map_err(serde_json::Error::custom)?;
                    return self.decode_one().map(Some);
                }
                (Framing::Array { first: false }, Some(byte)) => {
                    return Err(serde_json::Error::custom(format!(
                        "expected `,` or `]`, found `{}`",
                        byte.escape_ascii()
                    )));
                }
                (Framing::Array { first: true }, Some(_)) => {
                    self.framing = Framing::Array { first: false };
                    return self.decode_one().map(Some);
                }
                (Framing::AfterArray, None) | (Framing::Sequence, None) => {
                    self.framing = Framing::Finished;
                    return Ok(None);
                }
                (Framing::AfterArray, Some(_)) => {
                    return Err(serde_json::Error::custom(
                        "trailing characters after the order list",
                    ));
                }
                (Framing::Sequence, Some(_)) => return self.decode_one().map(Some),
            }
        }
    }
}

impl<R: BufRead> Iterator for OrderStream<R> {
    type Item = Result<Order>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(order)) => {
                self.record += 1;
                Some(Ok(order))
            }
            Ok(None) => None,
            Err(source) => {
                self.framing = Framing::Finished;
                Some(Err(StatError::MalformedRecordError {
                    path: self.path.clone(),
                    record: self.record,
                    offset: self.record_offset,
                    source,
                }))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for OrderStream<R> {}
