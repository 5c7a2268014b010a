//! ファイルI/Oユーティリティ（gzip対応・一時ファイル経由の書き込み）

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const READER_BUF_CAP: usize = 128 * 1024; // 128 KiB

fn is_gz(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// 拡張子が `.gz` なら展開しながら読むリーダー
pub fn open_reader<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead>> {
    let p = path.as_ref();
    let f = File::open(p)?;
    if is_gz(p) {
        let dec = flate2::read::GzDecoder::new(f);
        return Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, dec)));
    }
    Ok(Box::new(BufReader::with_capacity(READER_BUF_CAP, f)))
}

/// Writer wrapper to propagate finish/close errors for compressed outputs.
#[must_use = "call .close() to propagate compression/IO errors"]
pub enum Writer {
    Plain(BufWriter<File>),
    Gz(flate2::write::GzEncoder<BufWriter<File>>),
}

impl Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Writer::Plain(f) => f.write(buf),
            Writer::Gz(e) => e.write(buf),
        }
    }
    fn flush(&mut self) -> io::Result<()> {
        match self {
            Writer::Plain(f) => f.flush(),
            Writer::Gz(e) => e.flush(),
        }
    }
}

impl Writer {
    /// ストリームを閉じてディスクまで同期する
    pub fn close(self) -> io::Result<()> {
        let file = match self {
            Writer::Plain(f) => f.into_inner().map_err(|e| e.into_error())?,
            Writer::Gz(e) => e.finish()?.into_inner().map_err(|e| e.into_error())?,
        };
        file.sync_all()
    }
}

/// `compress` が真なら gzip で書くライター
fn open_writer_as(path: &Path, compress: bool) -> io::Result<Writer> {
    let f = BufWriter::new(File::create(path)?);
    if compress {
        let enc = flate2::write::GzEncoder::new(f, flate2::Compression::default());
        return Ok(Writer::Gz(enc));
    }
    Ok(Writer::Plain(f))
}

/// 拡張子が `.gz` なら圧縮して書くライター
pub fn open_writer<P: AsRef<Path>>(path: P) -> io::Result<Writer> {
    let p = path.as_ref();
    open_writer_as(p, is_gz(p))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// 一時ファイルに書いてから rename で置き換える
///
/// 途中で失敗しても `path` には書きかけのファイルが残らない。
/// 圧縮の有無は最終的な `path` の拡張子で決まる。
pub fn write_atomic<P, F>(path: P, write: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut Writer) -> io::Result<()>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let result = (|| {
        let mut w = open_writer_as(&tmp, is_gz(path))?;
        write(&mut w)?;
        w.close()?;
        fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_write_atomic_plain_and_gz() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.json", "b.json.gz"] {
            let path = dir.path().join("nested").join(name);
            write_atomic(&path, |w| w.write_all(b"hello")).unwrap();
            let mut s = String::new();
            open_reader(&path).unwrap().read_to_string(&mut s).unwrap();
            assert_eq!(s, "hello");
            assert!(!tmp_path(&path).exists());
        }
        let raw = fs::read(dir.path().join("nested/b.json.gz")).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_write_atomic_failure_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        let err = write_atomic(&path, |_| Err(io::Error::other("boom"))).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(!path.exists());
        assert!(!tmp_path(&path).exists());
    }
}
