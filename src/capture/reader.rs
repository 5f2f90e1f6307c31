//! Capture file reader.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, PcapBlockOwned, PcapError, PcapNGReader};
use tracing::debug;

use super::Frame;
use crate::error::{CaptureError, Error};

/// Buffer size for reading capture files (64KB).
const BUFFER_SIZE: usize = 65536;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reader for PCAP and PCAPNG files, with optional gzip decompression.
pub struct CaptureReader {
    inner: ReaderInner,
    path: String,
    frame_number: u64,
    link_type: u16,
    /// Timestamp subdivision per second (1e6, or 1e9 for nanosecond PCAP).
    ts_divisor: f64,
}

impl std::fmt::Debug for CaptureReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureReader")
            .field("path", &self.path)
            .field("frame_number", &self.frame_number)
            .field("link_type", &self.link_type)
            .field("ts_divisor", &self.ts_divisor)
            .finish_non_exhaustive()
    }
}

enum ReaderInner {
    Legacy(LegacyPcapReader<BufReader<Box<dyn Read + Send>>>),
    Ng(PcapNGReader<BufReader<Box<dyn Read + Send>>>),
}

impl CaptureReader {
    /// Open a capture file for reading.
    ///
    /// Automatically detects and decompresses gzipped files.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let display_path = path.display().to_string();

        // Check if file is gzipped (by extension or magic bytes)
        let is_gzipped = is_gzip_file(path)?;

        let mut buf_reader = open_stream(path, is_gzipped)?;

        // Peek at magic number to determine capture format
        let mut magic = [0u8; 4];
        buf_reader.read_exact(&mut magic).map_err(|_| {
            Error::Capture(CaptureError::CorruptCapture {
                path: display_path.clone(),
                reason: "file too short to read magic number".to_string(),
            })
        })?;

        // Re-open since we consumed the magic bytes
        drop(buf_reader);
        let buf_reader = open_stream(path, is_gzipped)?;

        debug!(path = %display_path, magic = ?magic, "opening capture");

        match &magic {
            // PCAP microsecond (either endianness)
            [0xd4, 0xc3, 0xb2, 0xa1] | [0xa1, 0xb2, 0xc3, 0xd4] => {
                Self::open_legacy(buf_reader, display_path, 1e6)
            }
            // PCAP nanosecond (either endianness)
            [0x4d, 0x3c, 0xb2, 0xa1] | [0xa1, 0xb2, 0x3c, 0x4d] => {
                Self::open_legacy(buf_reader, display_path, 1e9)
            }
            // PCAPNG section header
            [0x0a, 0x0d, 0x0d, 0x0a] => Self::open_ng(buf_reader, display_path),
            _ => Err(Error::Capture(CaptureError::CorruptCapture {
                path: display_path,
                reason: format!("unknown magic number: {magic:02x?}"),
            })),
        }
    }

    fn open_legacy(
        reader: BufReader<Box<dyn Read + Send>>,
        path: String,
        ts_divisor: f64,
    ) -> Result<Self, Error> {
        let pcap_reader = LegacyPcapReader::new(BUFFER_SIZE, reader).map_err(|e| {
            Error::Capture(CaptureError::CorruptCapture {
                path: path.clone(),
                reason: format!("failed to parse PCAP header: {e}"),
            })
        })?;

        Ok(Self {
            inner: ReaderInner::Legacy(pcap_reader),
            path,
            frame_number: 0,
            link_type: 1, // Default to Ethernet, updated from the global header
            ts_divisor,
        })
    }

    fn open_ng(reader: BufReader<Box<dyn Read + Send>>, path: String) -> Result<Self, Error> {
        let pcap_reader = PcapNGReader::new(BUFFER_SIZE, reader).map_err(|e| {
            Error::Capture(CaptureError::CorruptCapture {
                path: path.clone(),
                reason: format!("failed to parse PCAPNG header: {e}"),
            })
        })?;

        Ok(Self {
            inner: ReaderInner::Ng(pcap_reader),
            path,
            frame_number: 0,
            link_type: 1, // Updated from the interface description block
            ts_divisor: 1e6,
        })
    }

    /// Read the next frame.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, Error> {
        let is_legacy = matches!(self.inner, ReaderInner::Legacy(_));

        if is_legacy {
            self.next_legacy_impl()
        } else {
            self.next_ng_impl()
        }
    }

    /// Read the whole file into an ordered frame sequence.
    ///
    /// On-disk order is the implicit send order. An empty sequence is not
    /// itself an error; callers decide how to treat it.
    pub fn read_all(mut self) -> Result<Vec<Frame>, Error> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    fn corrupt(&self, reason: String) -> Error {
        Error::Capture(CaptureError::CorruptCapture {
            path: self.path.clone(),
            reason,
        })
    }

    fn next_legacy_impl(&mut self) -> Result<Option<Frame>, Error> {
        loop {
            let reader = match &mut self.inner {
                ReaderInner::Legacy(r) => r,
                _ => unreachable!(),
            };
            match reader.next() {
                Ok((offset, block)) => {
                    match block {
                        PcapBlockOwned::Legacy(packet) => {
                            self.frame_number += 1;

                            let timestamp = packet.ts_sec as f64
                                + packet.ts_usec as f64 / self.ts_divisor;
                            let data = packet.data.to_vec();
                            let frame =
                                Frame::new(self.frame_number, timestamp, self.link_type, data);

                            reader.consume(offset);
                            return Ok(Some(frame));
                        }
                        PcapBlockOwned::LegacyHeader(header) => {
                            self.link_type = header.network.0 as u16;
                            reader.consume(offset);
                            continue;
                        }
                        _ => {
                            reader.consume(offset);
                            continue;
                        }
                    }
                }
                Err(PcapError::Eof) => return Ok(None),
                Err(PcapError::Incomplete(_)) => {
                    if let Err(e) = reader.refill() {
                        let reason = format!("refill error: {e}");
                        return Err(self.corrupt(reason));
                    }
                    continue;
                }
                Err(e) => {
                    let reason = format!("parse error at frame {}: {e}", self.frame_number + 1);
                    return Err(self.corrupt(reason));
                }
            }
        }
    }

    fn next_ng_impl(&mut self) -> Result<Option<Frame>, Error> {
        loop {
            let reader = match &mut self.inner {
                ReaderInner::Ng(r) => r,
                _ => unreachable!(),
            };
            match reader.next() {
                Ok((offset, block)) => {
                    match block {
                        PcapBlockOwned::NG(ng_block) => {
                            use pcap_parser::pcapng::*;

                            match ng_block {
                                Block::InterfaceDescription(idb) => {
                                    self.link_type = idb.linktype.0 as u16;
                                    reader.consume(offset);
                                    continue;
                                }
                                Block::EnhancedPacket(epb) => {
                                    self.frame_number += 1;

                                    // Interface time units, microseconds by default
                                    let ts_units =
                                        ((epb.ts_high as u64) << 32) | epb.ts_low as u64;
                                    let timestamp = ts_units as f64 / self.ts_divisor;

                                    // Block data is padded to a 32-bit boundary;
                                    // caplen bounds the captured bytes
                                    let caplen = (epb.caplen as usize).min(epb.data.len());
                                    let frame = Frame::new(
                                        self.frame_number,
                                        timestamp,
                                        self.link_type,
                                        epb.data[..caplen].to_vec(),
                                    );

                                    reader.consume(offset);
                                    return Ok(Some(frame));
                                }
                                Block::SimplePacket(spb) => {
                                    self.frame_number += 1;

                                    // No timestamp in simple packet blocks; data is
                                    // padded like EPB data, origlen bounds it
                                    let caplen = (spb.origlen as usize).min(spb.data.len());
                                    let frame = Frame::new(
                                        self.frame_number,
                                        0.0,
                                        self.link_type,
                                        spb.data[..caplen].to_vec(),
                                    );

                                    reader.consume(offset);
                                    return Ok(Some(frame));
                                }
                                _ => {
                                    reader.consume(offset);
                                    continue;
                                }
                            }
                        }
                        _ => {
                            reader.consume(offset);
                            continue;
                        }
                    }
                }
                Err(PcapError::Eof) => return Ok(None),
                Err(PcapError::Incomplete(_)) => {
                    if let Err(e) = reader.refill() {
                        let reason = format!("refill error: {e}");
                        return Err(self.corrupt(reason));
                    }
                    continue;
                }
                Err(e) => {
                    let reason = format!("parse error at frame {}: {e}", self.frame_number + 1);
                    return Err(self.corrupt(reason));
                }
            }
        }
    }
}

/// Iterator adapter for CaptureReader.
impl Iterator for CaptureReader {
    type Item = Result<Frame, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Open the file, wrapping with a gzip decoder when needed, and map
/// open failures onto the capture error taxonomy.
fn open_stream(path: &Path, is_gzipped: bool) -> Result<BufReader<Box<dyn Read + Send>>, Error> {
    let file = File::open(path).map_err(|e| map_open_error(path, e))?;

    let reader: Box<dyn Read + Send> = if is_gzipped {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    Ok(BufReader::with_capacity(BUFFER_SIZE, reader))
}

fn map_open_error(path: &Path, e: std::io::Error) -> Error {
    let path = path.display().to_string();
    match e.kind() {
        ErrorKind::NotFound => Error::Capture(CaptureError::FileNotFound { path }),
        ErrorKind::PermissionDenied => Error::Capture(CaptureError::PermissionDenied { path }),
        _ => Error::Io(e),
    }
}

/// Check if a file is gzipped by extension or magic bytes.
fn is_gzip_file<P: AsRef<Path>>(path: P) -> Result<bool, Error> {
    let path = path.as_ref();

    if let Some(filename) = path.file_name().and_then(|f| f.to_str()) {
        if filename.to_lowercase().ends_with(".gz") {
            return Ok(true);
        }
    }

    let mut file = File::open(path).map_err(|e| map_open_error(path, e))?;

    let mut magic = [0u8; 2];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == GZIP_MAGIC),
        Err(_) => Ok(false), // File too short to be gzipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::testdata;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_frames_in_disk_order() {
        let pcap = testdata::build_pcap(&[
            (1.0, testdata::ethernet_frame(&[0xaa])),
            (1.5, testdata::ethernet_frame(&[0xbb])),
            (2.0, testdata::ethernet_frame(&[0xcc])),
        ]);

        let mut temp = NamedTempFile::with_suffix(".pcap").unwrap();
        temp.write_all(&pcap).unwrap();
        temp.flush().unwrap();

        let frames = CaptureReader::open(temp.path())
            .unwrap()
            .read_all()
            .unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].sequence_index, 1);
        assert_eq!(frames[2].sequence_index, 3);
        assert!((frames[1].timestamp - 1.5).abs() < 1e-9);
        assert_eq!(frames[0].link_type, 1);
        assert_eq!(frames[0].len(), 15);
        assert!(!frames[0].is_empty());
    }

    #[test]
    fn pcapng_frames_keep_exact_captured_length() {
        // 15 and 17 bytes: both force block padding to a 32-bit boundary
        let epb_frame = testdata::ethernet_frame(&[0x01]);
        let spb_frame = testdata::ethernet_frame(&[0x02, 0x03, 0x04]);
        let pcapng =
            testdata::build_pcapng(&[(1.5, epb_frame.clone())], &[spb_frame.clone()]);

        let mut temp = NamedTempFile::with_suffix(".pcapng").unwrap();
        temp.write_all(&pcapng).unwrap();
        temp.flush().unwrap();

        let frames = CaptureReader::open(temp.path())
            .unwrap()
            .read_all()
            .unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].data, epb_frame);
        assert_eq!(frames[0].len(), 15);
        assert!((frames[0].timestamp - 1.5).abs() < 1e-6);
        assert_eq!(frames[0].link_type, 1);
        assert_eq!(frames[1].data, spb_frame);
        assert_eq!(frames[1].len(), 17);
        assert_eq!(frames[1].timestamp, 0.0);
    }

    #[test]
    fn nanosecond_pcap_uses_nanosecond_divisor() {
        let pcap = testdata::build_pcap_ns(&[
            (1.25, testdata::ethernet_frame(&[0xaa])),
            (0.000_000_001, testdata::ethernet_frame(&[0xbb])),
        ]);

        let mut temp = NamedTempFile::with_suffix(".pcap").unwrap();
        temp.write_all(&pcap).unwrap();
        temp.flush().unwrap();

        let frames = CaptureReader::open(temp.path())
            .unwrap()
            .read_all()
            .unwrap();

        assert_eq!(frames.len(), 2);
        assert!((frames[0].timestamp - 1.25).abs() < 1e-9);
        // One nanosecond: representable only with the nanosecond divisor
        assert!((frames[1].timestamp - 1e-9).abs() < 1e-12);
    }

    #[test]
    fn empty_capture_is_not_an_error() {
        let pcap = testdata::build_pcap(&[]);

        let mut temp = NamedTempFile::with_suffix(".pcap").unwrap();
        temp.write_all(&pcap).unwrap();
        temp.flush().unwrap();

        let frames = CaptureReader::open(temp.path())
            .unwrap()
            .read_all()
            .unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn missing_file_maps_to_file_not_found() {
        let err = CaptureReader::open("/nonexistent/capture.pcap").unwrap_err();
        assert!(matches!(
            err,
            Error::Capture(CaptureError::FileNotFound { .. })
        ));
    }

    #[test]
    fn garbage_magic_is_corrupt() {
        let mut temp = NamedTempFile::with_suffix(".pcap").unwrap();
        temp.write_all(b"not a capture file at all").unwrap();
        temp.flush().unwrap();

        let err = CaptureReader::open(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::Capture(CaptureError::CorruptCapture { .. })
        ));
    }

    #[test]
    fn reads_gzipped_capture() {
        let pcap = testdata::build_pcap(&[(0.0, testdata::ethernet_frame(&[0x01, 0x02]))]);

        let temp = NamedTempFile::with_suffix(".pcap.gz").unwrap();
        {
            let file = File::create(temp.path()).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(&pcap).unwrap();
            encoder.finish().unwrap();
        }

        let frames = CaptureReader::open(temp.path())
            .unwrap()
            .read_all()
            .unwrap();
        assert_eq!(frames.len(), 1);
    }
}
