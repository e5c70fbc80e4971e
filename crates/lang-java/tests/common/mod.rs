use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;

pub const ACC_PUBLIC_SUPER: u16 = 0x0021;
pub const ACC_PUBLIC_INTERFACE: u16 = 0x0601;
pub const ACC_PUBLIC_ANNOTATION: u16 = 0x2601;
pub const ACC_PUBLIC_ENUM: u16 = 0x4031;

fn push_utf8(out: &mut Vec<u8>, text: &str) {
    out.push(1);
    out.extend_from_slice(&(text.len() as u16).to_be_bytes());
    out.extend_from_slice(text.as_bytes());
}

/// Smallest valid class file: no fields, methods or attributes.
#[allow(dead_code)]
pub fn class_bytes(internal_name: &str, flags: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFEBABE_u32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // minor
    out.extend_from_slice(&52u16.to_be_bytes()); // major, Java 8

    // #1 Class(#2), #2 this name, #3 Class(#4), #4 super name
    out.extend_from_slice(&5u16.to_be_bytes());
    out.extend_from_slice(&[7, 0, 2]);
    push_utf8(&mut out, internal_name);
    out.extend_from_slice(&[7, 0, 4]);
    push_utf8(&mut out, "java/lang/Object");

    out.extend_from_slice(&flags.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // this_class
    out.extend_from_slice(&3u16.to_be_bytes()); // super_class
    out.extend_from_slice(&0u16.to_be_bytes()); // interfaces
    out.extend_from_slice(&0u16.to_be_bytes()); // fields
    out.extend_from_slice(&0u16.to_be_bytes()); // methods
    out.extend_from_slice(&0u16.to_be_bytes()); // attributes
    out
}

#[allow(dead_code)]
pub fn public_class(internal_name: &str) -> Vec<u8> {
    class_bytes(internal_name, ACC_PUBLIC_SUPER)
}

#[allow(dead_code)]
pub fn write_class(root: &Path, internal_name: &str, bytes: &[u8]) {
    let path = root.join(format!("{}.class", internal_name));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

#[allow(dead_code)]
pub fn write_jar(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}
