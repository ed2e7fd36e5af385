//! MATLAB level 4 (MAT v4) container reader
//!
//! Result files are a plain sequence of MAT v4 matrices. Each matrix is a
//! 20 byte header, a NUL-terminated label and the elements in column-major
//! order.
//!
//! ## Header
//! Five 32-bit integers `type, mrows, ncols, imagf, namlen`, where
//! `type = M*1000 + O*100 + P*10 + T`:
//! - M: 0 little-endian, 1 big-endian
//! - O: always 0
//! - P: element precision (f64, f32, i32, i16, u16, u8)
//! - T: 0 numeric, 1 text (sparse matrices are not supported)
//!
//! ## Orientation
//! The `Aclass` matrix names the layout. With `binTrans` (the default) each
//! stored column is one event; with `binNormal` each stored row is.

use crate::handler::MatrixHandler;
use crate::text::decode_text;
use crate::types::{DecoderError, ElementFormat, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const HEADER_SIZE: usize = 20;
const CLASS_MATRIX: &str = "Aclass";

/// Byte order of one matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

/// Decoded matrix header
#[derive(Debug, Clone, PartialEq, Eq)]
struct MatrixHeader {
    endian: Endian,
    format: ElementFormat,
    is_text: bool,
    rows: usize,
    cols: usize,
    has_imaginary: bool,
    name_len: usize,
}

impl MatrixHeader {
    fn parse(buf: &[u8; HEADER_SIZE]) -> Result<Self> {
        // The M digit lives inside the type word itself, so try both orders
        let (endian, ints) = if plausible_type(LittleEndian::read_i32(&buf[0..4]), 0) {
            (Endian::Little, read_ints::<LittleEndian>(buf))
        } else if plausible_type(BigEndian::read_i32(&buf[0..4]), 1) {
            (Endian::Big, read_ints::<BigEndian>(buf))
        } else {
            return Err(DecoderError::Format(format!(
                "unrecognised matrix type word {:02X?}",
                &buf[0..4]
            )));
        };

        let [mopt, mrows, ncols, imagf, namlen] = ints;
        let order = (mopt / 100) % 10;
        let precision = (mopt / 10) % 10;
        let kind = mopt % 10;

        if order != 0 {
            return Err(DecoderError::Format(format!("reserved digit is {} (type {})", order, mopt)));
        }
        let format = ElementFormat::from_precision(precision).ok_or_else(|| {
            DecoderError::Format(format!("unsupported precision {} (type {})", precision, mopt))
        })?;
        let is_text = match kind {
            0 => false,
            1 => true,
            2 => return Err(DecoderError::Format("sparse matrices are not supported".to_string())),
            other => return Err(DecoderError::Format(format!("unknown matrix kind {}", other))),
        };
        if mrows < 0 || ncols < 0 || namlen <= 0 {
            return Err(DecoderError::Format(format!(
                "invalid dimensions {}x{} (label length {})",
                mrows, ncols, namlen
            )));
        }

        Ok(Self {
            endian,
            format,
            is_text,
            rows: mrows as usize,
            cols: ncols as usize,
            has_imaginary: imagf != 0,
            name_len: namlen as usize,
        })
    }

    /// Byte length of one (real or imaginary) element block
    fn data_len(&self) -> Result<usize> {
        self.rows
            .checked_mul(self.cols)
            .and_then(|n| n.checked_mul(self.format.size()))
            .ok_or_else(|| DecoderError::Format(format!("matrix {}x{} too large", self.rows, self.cols)))
    }
}

fn plausible_type(mopt: i32, machine: i32) -> bool {
    (0..5000).contains(&mopt) && mopt / 1000 == machine
}

fn read_ints<B: ByteOrder>(buf: &[u8; HEADER_SIZE]) -> [i32; 5] {
    let mut ints = [0i32; 5];
    B::read_i32_into(&buf[..], &mut ints);
    ints
}

fn widen<B: ByteOrder>(bytes: &[u8], format: ElementFormat) -> Vec<f64> {
    let size = format.size();
    bytes
        .chunks_exact(size)
        .map(|b| match format {
            ElementFormat::Double => B::read_f64(b),
            ElementFormat::Single => B::read_f32(b) as f64,
            ElementFormat::Int32 => B::read_i32(b) as f64,
            ElementFormat::Int16 => B::read_i16(b) as f64,
            ElementFormat::UInt16 => B::read_u16(b) as f64,
            ElementFormat::UInt8 => b[0] as f64,
        })
        .collect()
}

/// Streams the matrices of a MAT v4 container into a `MatrixHandler`
pub struct MatReader<R: Read> {
    reader: R,
    transposed: bool,
}

impl MatReader<BufReader<File>> {
    /// Open a result file for reading
    pub fn open(path: &Path) -> Result<Self> {
        log::info!("Opening result file: {:?}", path);
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> MatReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            transposed: true,
        }
    }

    /// Feed every matrix to `handler` until the stream ends or the handler
    /// asks to stop
    pub fn read_into<H: MatrixHandler>(&mut self, handler: &mut H) -> Result<()> {
        let mut matrices = 0usize;

        while let Some(header) = self.read_header()? {
            let label = self.read_label(header.name_len)?;
            let data = self.read_elements(&header, &label)?;
            matrices += 1;

            log::debug!(
                "Matrix '{}': {}x{} {}{}",
                label,
                header.rows,
                header.cols,
                header.format,
                if header.is_text { " text" } else { "" }
            );

            if label == CLASS_MATRIX {
                self.transposed = class_is_transposed(&data, header.rows, header.cols)?;
                emit_rows(handler, &label, header.format, &data, header.rows, header.cols)?;
            } else if self.transposed {
                emit_columns(handler, &label, header.format, &data, header.rows, header.cols)?;
            } else {
                emit_rows(handler, &label, header.format, &data, header.rows, header.cols)?;
            }

            if handler.on_matrix_end(&label) {
                log::debug!("Handler finished after '{}', stopping early", label);
                return Ok(());
            }
        }

        log::debug!("Read {} matrices", matrices);
        Ok(())
    }

    /// Read a header, or None at a clean end of stream
    fn read_header(&mut self) -> Result<Option<MatrixHeader>> {
        let mut buf = [0u8; HEADER_SIZE];
        let mut filled = 0;
        while filled < HEADER_SIZE {
            let n = self.reader.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        match filled {
            0 => Ok(None),
            HEADER_SIZE => MatrixHeader::parse(&buf).map(Some),
            n => Err(DecoderError::Format(format!("truncated matrix header ({} bytes)", n))),
        }
    }

    fn read_label(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_block(len, "matrix label")?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(bytes[..end].iter().map(|&b| b as char).collect())
    }

    fn read_elements(&mut self, header: &MatrixHeader, label: &str) -> Result<Vec<f64>> {
        let len = header.data_len()?;
        let bytes = self.read_block(len, label)?;
        if header.has_imaginary {
            self.read_block(len, label)?;
        }

        Ok(match header.endian {
            Endian::Little => widen::<LittleEndian>(&bytes, header.format),
            Endian::Big => widen::<BigEndian>(&bytes, header.format),
        })
    }

    /// Read exactly `len` bytes without trusting `len` for the allocation
    fn read_block(&mut self, len: usize, what: &str) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        (&mut self.reader).take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len {
            return Err(DecoderError::Format(format!(
                "truncated '{}': expected {} bytes, got {}",
                what,
                len,
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

/// Each stored column is one event
fn emit_columns<H: MatrixHandler>(
    handler: &mut H,
    label: &str,
    format: ElementFormat,
    data: &[f64],
    rows: usize,
    cols: usize,
) -> Result<()> {
    if rows == 0 {
        return Ok(());
    }
    for (j, column) in data.chunks_exact(rows).enumerate() {
        handler.on_column(label, j + 1, format, column, j + 1 == cols)?;
    }
    Ok(())
}

/// Each stored row is one event
fn emit_rows<H: MatrixHandler>(
    handler: &mut H,
    label: &str,
    format: ElementFormat,
    data: &[f64],
    rows: usize,
    cols: usize,
) -> Result<()> {
    let mut row = Vec::with_capacity(cols);
    for i in 0..rows {
        row.clear();
        row.extend((0..cols).map(|j| data[i + j * rows]));
        handler.on_column(label, i + 1, format, &row, i + 1 == rows)?;
    }
    Ok(())
}

/// Read the layout from the fourth row of `Aclass`
fn class_is_transposed(data: &[f64], rows: usize, cols: usize) -> Result<bool> {
    if rows < 4 {
        log::warn!("'{}' has {} rows, assuming binTrans", CLASS_MATRIX, rows);
        return Ok(true);
    }
    let codes: Vec<f64> = (0..cols).map(|j| data[3 + j * rows]).collect();
    let layout = decode_text(CLASS_MATRIX, 4, &codes)?;
    match layout.as_str() {
        "binTrans" => Ok(true),
        "binNormal" => Ok(false),
        other => {
            log::warn!("Unknown layout '{}', assuming binTrans", other);
            Ok(true)
        }
    }
}
