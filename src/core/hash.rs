//! core/hash.rs
//!
//! Content fingerprint of an MP3: xxh64 over the audio bytes only.
//!
//! - A leading ID3v2 tag is skipped (its header says how big it is)
//! - A trailing 128-byte ID3v1 block (`TAG...`) is skipped
//! - So rewriting tags never changes the fingerprint

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use xxhash_rust::xxh64::Xxh64;

const ID3V2_HEADER_LEN: u64 = 10;
const ID3V1_LEN: u64 = 128;
const CHUNK: usize = 64 * 1024;

/// Hex xxh64 (16 lowercase digits) of the audio region of `path`.
pub fn content_hash(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let file_len = file.metadata()?.len();

    let start = id3v2_len(&mut file)?.min(file_len);
    let end = if has_id3v1(&mut file, file_len)? {
        file_len - ID3V1_LEN
    } else {
        file_len
    };

    file.seek(SeekFrom::Start(start))?;
    let mut audio = file.take(end.saturating_sub(start));

    let mut hasher = Xxh64::new(0);
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = audio.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:016x}", hasher.digest()))
}

/// Full size of a leading ID3v2 tag (header + body + optional footer), or 0.
fn id3v2_len(file: &mut File) -> io::Result<u64> {
    let mut header = [0u8; ID3V2_HEADER_LEN as usize];
    file.seek(SeekFrom::Start(0))?;
    if !read_full(file, &mut header)? || &header[..3] != b"ID3" {
        return Ok(0);
    }

    // Body size is a 28-bit "syncsafe" integer: 7 bits per byte.
    let body = header[6..10]
        .iter()
        .fold(0u64, |acc, b| (acc << 7) | u64::from(b & 0x7f));
    let footer = if header[5] & 0x10 != 0 {
        ID3V2_HEADER_LEN
    } else {
        0
    };

    Ok(ID3V2_HEADER_LEN + body + footer)
}

fn has_id3v1(file: &mut File, file_len: u64) -> io::Result<bool> {
    if file_len < ID3V1_LEN {
        return Ok(false);
    }
    let mut magic = [0u8; 3];
    file.seek(SeekFrom::Start(file_len - ID3V1_LEN))?;
    Ok(read_full(file, &mut magic)? && &magic == b"TAG")
}

/// Like `read_exact`, but a short file is `Ok(false)` instead of an error.
fn read_full(file: &mut File, buf: &mut [u8]) -> io::Result<bool> {
    match file.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    fn audio() -> Vec<u8> {
        (0..5000u32).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[test]
    fn plain_audio_hash_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.mp3", &audio());
        let b = write(dir.path(), "b.mp3", &audio());

        let ha = content_hash(&a).unwrap();
        assert_eq!(ha.len(), 16);
        assert_eq!(ha, content_hash(&b).unwrap());
        assert_eq!(ha, format!("{:016x}", xxhash_rust::xxh64::xxh64(&audio(), 0)));
    }

    #[test]
    fn skips_id3v2_header_and_v1_footer() {
        let dir = tempfile::tempdir().unwrap();
        let plain = write(dir.path(), "plain.mp3", &audio());

        // ID3v2.4 header with a 20-byte body (syncsafe 0,0,0,20).
        let mut tagged = vec![b'I', b'D', b'3', 4, 0, 0, 0, 0, 0, 20];
        tagged.extend_from_slice(&[0u8; 20]);
        tagged.extend_from_slice(&audio());
        let mut v1 = vec![0u8; 128];
        v1[..3].copy_from_slice(b"TAG");
        tagged.extend_from_slice(&v1);
        let tagged = write(dir.path(), "tagged.mp3", &tagged);

        assert_eq!(content_hash(&plain).unwrap(), content_hash(&tagged).unwrap());
    }

    #[test]
    fn syncsafe_size_uses_seven_bits() {
        let dir = tempfile::tempdir().unwrap();
        // 0x01 0x00 => 128 bytes of body.
        let mut bytes = vec![b'I', b'D', b'3', 3, 0, 0, 0, 0, 1, 0];
        bytes.extend_from_slice(&[0xAA; 128]);
        bytes.extend_from_slice(&audio());
        let path = write(dir.path(), "s.mp3", &bytes);

        let plain = write(dir.path(), "p.mp3", &audio());
        assert_eq!(content_hash(&path).unwrap(), content_hash(&plain).unwrap());
    }

    #[test]
    fn tiny_files_do_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "t.mp3", b"ID");
        assert_eq!(content_hash(&path).unwrap().len(), 16);
    }
}
