//! Minimal Shell Link (`.lnk`) encoding.
//!
//! Writes a link with a `LinkInfo` block carrying the local target path and
//! the `WORKING_DIR` / `COMMAND_LINE_ARGUMENTS` string data, which is what the
//! Windows shell needs to launch the target. Only those fields are decoded.

use std::io;
use std::path::{Path, PathBuf};

const HEADER_SIZE: u32 = 0x4C;
const LINK_CLSID: [u8; 16] = [
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

const HAS_LINK_TARGET_ID_LIST: u32 = 0x01;
const HAS_LINK_INFO: u32 = 0x02;
const HAS_NAME: u32 = 0x04;
const HAS_RELATIVE_PATH: u32 = 0x08;
const HAS_WORKING_DIR: u32 = 0x10;
const HAS_ARGUMENTS: u32 = 0x20;
const IS_UNICODE: u32 = 0x80;

const LINK_INFO_HEADER_SIZE: u32 = 0x24;
const VOLUME_ID_AND_LOCAL_BASE_PATH: u32 = 0x01;
const DRIVE_FIXED: u32 = 3;
const SW_SHOWNORMAL: u32 = 1;

/// Fields written into a shortcut file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLink {
    pub target: PathBuf,
    pub working_directory: Option<PathBuf>,
    pub arguments: Option<String>,
}

/// Fields read back from a shortcut file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellLinkStrings {
    pub target: Option<String>,
    pub working_directory: Option<String>,
    pub arguments: Option<String>,
}

fn native(path: &Path) -> String {
    path.to_string_lossy().replace('/', "\\")
}

fn push_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn too_long(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{what} is too long for a shortcut"),
    )
}

fn push_string_data(buf: &mut Vec<u8>, value: &str, what: &str) -> io::Result<()> {
    let units = utf16(value);
    let count = u16::try_from(units.len()).map_err(|_| too_long(what))?;
    push_u16(buf, count);
    for unit in units {
        push_u16(buf, unit);
    }
    Ok(())
}

fn link_info(target: &str) -> io::Result<Vec<u8>> {
    // VolumeID: size, drive type, serial, label offset, empty label.
    let mut volume_id = Vec::new();
    push_u32(&mut volume_id, 0x11);
    push_u32(&mut volume_id, DRIVE_FIXED);
    push_u32(&mut volume_id, 0);
    push_u32(&mut volume_id, 0x10);
    volume_id.push(0);

    let ansi: Vec<u8> = target
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .chain(std::iter::once(0))
        .collect();
    let wide: Vec<u16> = utf16(target).into_iter().chain(std::iter::once(0)).collect();

    let volume_offset = LINK_INFO_HEADER_SIZE;
    let base_offset = volume_offset + volume_id.len() as u32;
    let suffix_offset = base_offset + ansi.len() as u32;
    let base_unicode_offset = suffix_offset + 1;
    let suffix_unicode_offset = base_unicode_offset + (wide.len() * 2) as u32;
    let total = suffix_unicode_offset + 2;

    let mut info = Vec::with_capacity(total as usize);
    push_u32(&mut info, total);
    push_u32(&mut info, LINK_INFO_HEADER_SIZE);
    push_u32(&mut info, VOLUME_ID_AND_LOCAL_BASE_PATH);
    push_u32(&mut info, volume_offset);
    push_u32(&mut info, base_offset);
    push_u32(&mut info, 0);
    push_u32(&mut info, suffix_offset);
    push_u32(&mut info, base_unicode_offset);
    push_u32(&mut info, suffix_unicode_offset);
    info.extend_from_slice(&volume_id);
    info.extend_from_slice(&ansi);
    info.push(0);
    for unit in wide {
        push_u16(&mut info, unit);
    }
    push_u16(&mut info, 0);

    if info.len() != total as usize {
        return Err(too_long("target path"));
    }
    Ok(info)
}

/// Encodes `link` as the bytes of a `.lnk` file.
///
/// Path separators are converted to backslashes. A missing working directory
/// defaults to the target's parent directory.
pub fn encode_shell_link(link: &ShellLink) -> io::Result<Vec<u8>> {
    let target = native(&link.target);
    let working_directory = link
        .working_directory
        .clone()
        .or_else(|| link.target.parent().map(Path::to_path_buf))
        .map(|dir| native(&dir))
        .filter(|dir| !dir.is_empty());

    let mut flags = HAS_LINK_INFO | IS_UNICODE;
    if working_directory.is_some() {
        flags |= HAS_WORKING_DIR;
    }
    if link.arguments.is_some() {
        flags |= HAS_ARGUMENTS;
    }

    let mut buf = Vec::new();
    push_u32(&mut buf, HEADER_SIZE);
    buf.extend_from_slice(&LINK_CLSID);
    push_u32(&mut buf, flags);
    push_u32(&mut buf, 0); // file attributes
    buf.extend_from_slice(&[0u8; 24]); // creation, access, write times
    push_u32(&mut buf, 0); // file size
    push_u32(&mut buf, 0); // icon index
    push_u32(&mut buf, SW_SHOWNORMAL);
    push_u16(&mut buf, 0); // hotkey
    buf.extend_from_slice(&[0u8; 10]);

    buf.extend_from_slice(&link_info(&target)?);

    if let Some(dir) = &working_directory {
        push_string_data(&mut buf, dir, "working directory")?;
    }
    if let Some(args) = &link.arguments {
        push_string_data(&mut buf, args, "argument string")?;
    }

    // Terminal extra-data block.
    push_u32(&mut buf, 0);
    Ok(buf)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> io::Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| invalid("truncated shortcut"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> io::Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> io::Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn string_data(&mut self, unicode: bool) -> io::Result<String> {
        let count = self.u16()? as usize;
        if unicode {
            let raw = self.take(count * 2)?;
            let units: Vec<u16> = raw
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16(&units).map_err(|_| invalid("invalid UTF-16 in shortcut"))
        } else {
            Ok(String::from_utf8_lossy(self.take(count)?).into_owned())
        }
    }
}

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

fn wide_cstr(bytes: &[u8], offset: usize) -> Option<String> {
    let units: Vec<u16> = bytes
        .get(offset..)?
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|unit| *unit != 0)
        .collect();
    String::from_utf16(&units).ok()
}

fn ansi_cstr(bytes: &[u8], offset: usize) -> Option<String> {
    let raw = bytes.get(offset..)?;
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    Some(String::from_utf8_lossy(&raw[..end]).into_owned())
}

/// Reads the target, working directory and arguments from `.lnk` bytes.
pub fn decode_shell_link(bytes: &[u8]) -> io::Result<ShellLinkStrings> {
    let mut reader = Reader { bytes, pos: 0 };
    if reader.u32()? != HEADER_SIZE || reader.take(16)? != LINK_CLSID {
        return Err(invalid("not a shell link"));
    }
    let flags = reader.u32()?;
    reader.take(HEADER_SIZE as usize - 24)?;

    if flags & HAS_LINK_TARGET_ID_LIST != 0 {
        let len = reader.u16()? as usize;
        reader.take(len)?;
    }

    let mut out = ShellLinkStrings::default();
    if flags & HAS_LINK_INFO != 0 {
        let start = reader.pos;
        let size = reader.u32()? as usize;
        let header_size = reader.u32()?;
        let info_flags = reader.u32()?;
        let _volume = reader.u32()?;
        let base = reader.u32()? as usize;
        reader.take(8)?;
        let base_unicode = if header_size >= LINK_INFO_HEADER_SIZE {
            Some(reader.u32()? as usize)
        } else {
            None
        };
        let info = bytes
            .get(start..start + size)
            .ok_or_else(|| invalid("truncated link info"))?;
        if info_flags & VOLUME_ID_AND_LOCAL_BASE_PATH != 0 {
            out.target = match base_unicode {
                Some(offset) => wide_cstr(info, offset),
                None => ansi_cstr(info, base),
            };
        }
        reader.pos = start + size;
    }

    let unicode = flags & IS_UNICODE != 0;
    if flags & HAS_NAME != 0 {
        reader.string_data(unicode)?;
    }
    if flags & HAS_RELATIVE_PATH != 0 {
        reader.string_data(unicode)?;
    }
    if flags & HAS_WORKING_DIR != 0 {
        out.working_directory = Some(reader.string_data(unicode)?);
    }
    if flags & HAS_ARGUMENTS != 0 {
        out.arguments = Some(reader.string_data(unicode)?);
    }
    Ok(out)
}
