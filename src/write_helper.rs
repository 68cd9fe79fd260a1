use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

pub(crate) fn write_chunk_header(mut w: impl Write, compressed_size: u16, raw_size: u16) -> io::Result<()> {
    w.write_u16::<LittleEndian>(compressed_size)?;
    w.write_u16::<LittleEndian>(raw_size)
}

