//! Header emitter: the tag table as an include-guarded C++ enumeration.

use std::io::Write;
use std::path::Path;

use class_tag::TagTable;
use tempfile::NamedTempFile;

use crate::config::HeaderOptions;

/// Render the header text.
///
/// Entries appear in table order (root first, breadth-first), names
/// upper-cased. Names are not validated; they must already be identifiers.
pub fn render_header(tags: &TagTable, options: &HeaderOptions) -> String {
    let guard = &options.include_guard;
    let enum_name = &options.enum_name;
    let mut out = String::new();

    out.push_str(&format!("#ifndef {guard}\n"));
    out.push_str(&format!("#define {guard}\n"));
    out.push_str(&format!("enum {enum_name} {{\n"));
    for entry in tags.entries() {
        out.push_str(&format!("{} = {},\n", entry.name.to_uppercase(), entry.tag));
    }
    out.push_str("};\n");

    if options.name_lookup {
        out.push_str(&format!(
            "inline const char* get{enum_name}Name(const {enum_name}& type) {{\n"
        ));
        out.push_str("\tswitch (type) {\n");
        for entry in tags.entries() {
            let name = entry.name.to_uppercase();
            out.push_str(&format!("\t\tcase {name}:\n"));
            out.push_str(&format!("\t\t\treturn \"{name}\";\n"));
        }
        out.push_str("\t}\n");
        out.push_str("\treturn \"\";\n");
        out.push_str("}\n");
    }

    out.push_str(&format!("#endif // {guard}\n"));
    out
}

/// Write the header to `output`.
///
/// The text goes to a temporary file beside `output` which is then renamed
/// over it, so an interrupted write leaves the previous header intact.
pub fn emit_header(
    tags: &TagTable,
    options: &HeaderOptions,
    output: impl AsRef<Path>,
) -> std::io::Result<()> {
    let output = output.as_ref();
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(render_header(tags, options).as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| e.error)?;
    Ok(())
}
