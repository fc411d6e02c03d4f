//! Text and JSON rendering of a loaded file

use anyhow::{Context, Result};
use aurora_gff::{GffFieldType, GffFile, GffOptions, GffStruct, GffValue, LocString};
use serde_json::{Map, Value, json};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Open and load a file, checking the header against `tag` when given and
/// otherwise accepting the tag the file declares
pub fn load(path: &Path, tag: Option<[u8; 4]>) -> Result<GffFile<BufReader<File>>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let tag = match tag {
        Some(tag) => tag,
        None => {
            let mut declared = [0u8; 4];
            reader
                .read_exact(&mut declared)
                .with_context(|| format!("{} is too short for a GFF header", path.display()))?;
            reader.seek(SeekFrom::Start(0))?;
            debug!(tag = %String::from_utf8_lossy(&declared), "using declared tag");
            declared
        }
    };

    GffFile::load_with(reader, &GffOptions::new(tag))
        .with_context(|| format!("failed to load {}", path.display()))
}

/// Header summary followed by an indented field tree
pub fn render_text<R: Read + Seek>(file: &GffFile<R>, depth: usize) -> Result<String> {
    let header = file.header();
    let mut out = String::new();
    writeln!(out, "{} {}", header.tag_str().trim_end(), header.version_str())?;
    writeln!(
        out,
        "structs: {}  fields: {}  labels: {}  lists: {}",
        header.struct_count,
        header.field_count,
        header.label_count,
        file.list_count()
    )?;

    if file.struct_count() > 0 {
        let root = file.top_level()?;
        writeln!(out)?;
        writeln!(out, "{}", struct_title(root))?;
        write_struct(&mut out, root, 1, depth)?;
    }
    Ok(out)
}

fn struct_title<R: Read + Seek>(s: GffStruct<'_, R>) -> String {
    format!("struct #{} (id {})", s.index(), s.id())
}

fn write_struct<R: Read + Seek>(
    out: &mut String,
    s: GffStruct<'_, R>,
    indent: usize,
    depth: usize,
) -> Result<()> {
    let pad = "  ".repeat(indent);
    for (label, field) in s.fields()? {
        let field_type = field.field_type();
        match field_type {
            GffFieldType::Struct => {
                let child = s.get_struct(label)?;
                if depth == 0 {
                    writeln!(out, "{pad}{label} ({field_type}) -> {} ...", struct_title(child))?;
                } else {
                    writeln!(out, "{pad}{label} ({field_type}) -> {}", struct_title(child))?;
                    write_struct(out, child, indent + 1, depth - 1)?;
                }
            }
            GffFieldType::List => {
                let list = s.get_list(label)?;
                if depth == 0 {
                    writeln!(out, "{pad}{label} ({field_type}) -> {} entries ...", list.len())?;
                    continue;
                }
                writeln!(out, "{pad}{label} ({field_type}) -> {} entries", list.len())?;
                for (position, child) in list.iter().enumerate() {
                    writeln!(out, "{pad}  [{position}] {}", struct_title(child))?;
                    write_struct(out, child, indent + 2, depth - 1)?;
                }
            }
            _ => {
                let value = s
                    .value(label)?
                    .map(|value| display_value(&value))
                    .unwrap_or_default();
                writeln!(out, "{pad}{label} ({field_type}) = {value}")?;
            }
        }
    }
    Ok(())
}

fn display_value(value: &GffValue) -> String {
    match value {
        GffValue::LocString(loc) => match loc.preferred() {
            Some(text) => format!("{text:?} (strref {})", loc.string_ref()),
            None => format!("(strref {})", loc.string_ref()),
        },
        GffValue::ExoString(text) | GffValue::ResRef(text) => format!("{text:?}"),
        other => other.to_string(),
    }
}

/// Header summary and field tree as a JSON document
pub fn render_json<R: Read + Seek>(file: &GffFile<R>, depth: usize) -> Result<Value> {
    let header = file.header();
    let root = if file.struct_count() > 0 {
        struct_json(file.top_level()?, depth)?
    } else {
        Value::Null
    };

    Ok(json!({
        "tag": header.tag_str(),
        "version": header.version_str(),
        "structs": header.struct_count,
        "fields": header.field_count,
        "labels": header.label_count,
        "lists": file.list_count(),
        "root": root,
    }))
}

fn struct_json<R: Read + Seek>(s: GffStruct<'_, R>, depth: usize) -> Result<Value> {
    let mut fields = Vec::new();
    for (label, field) in s.fields()? {
        let field_type = field.field_type();
        let value = match field_type {
            GffFieldType::Struct if depth == 0 => json!({ "truncated": true }),
            GffFieldType::Struct => struct_json(s.get_struct(label)?, depth - 1)?,
            GffFieldType::List if depth == 0 => json!({ "truncated": true }),
            GffFieldType::List => Value::Array(
                s.get_list(label)?
                    .iter()
                    .map(|child| struct_json(child, depth - 1))
                    .collect::<Result<Vec<_>>>()?,
            ),
            _ => s.value(label)?.map(|v| value_json(&v)).unwrap_or(Value::Null),
        };
        fields.push(json!({
            "label": label,
            "type": field_type.name(),
            "value": value,
        }));
    }

    Ok(json!({
        "index": s.index(),
        "id": s.id(),
        "fields": fields,
    }))
}

fn value_json(value: &GffValue) -> Value {
    match value {
        GffValue::Byte(v) => json!(v),
        GffValue::Char(v) => json!(v),
        GffValue::Uint16(v) => json!(v),
        GffValue::Sint16(v) => json!(v),
        GffValue::Uint32(v) | GffValue::StrRef(v) => json!(v),
        GffValue::Sint32(v) => json!(v),
        GffValue::Uint64(v) => json!(v),
        GffValue::Sint64(v) => json!(v),
        GffValue::Float(v) => json!(f64::from(*v)),
        GffValue::Double(v) => json!(v),
        GffValue::ExoString(s) | GffValue::ResRef(s) => json!(s),
        GffValue::LocString(loc) => loc_string_json(loc),
        GffValue::Void(bytes) => json!(bytes),
        GffValue::Vector(v) => json!(v),
        GffValue::Orientation(v) => json!(v),
        GffValue::Struct(index) => json!({ "struct": index }),
        GffValue::List(offset) => json!({ "list_offset": offset }),
    }
}

fn loc_string_json(loc: &LocString) -> Value {
    let strings: Map<String, Value> = loc
        .iter()
        .map(|(id, text)| (id.to_string(), json!(text)))
        .collect();
    json!({
        "strref": loc.string_ref(),
        "strings": strings,
    })
}
