//! Blob containers: one asset's metadata plus its payload in a single XML file.
//!
//! Containers are always XML, whatever [`ContentFormat`](crate::ContentFormat)
//! the group documents use, so a blob directory reads the same for every
//! export.
//!
//! ```xml
//! <blob id="..." itemId="..." filename="logo.png" path="/media/logo" length="1024">
//!   <fields>
//!     <field name="Alt" value="Company logo"/>
//!   </fields>
//!   <data><![CDATA[iVBORw0KGgo...]]></data>
//! </blob>
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use cmsport_resolve::AssetDescriptor;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::{file_stem, Error, Result};

/// Extension appended to the asset filename for its container.
pub const CONTAINER_EXTENSION: &str = "xml";

/// Where the container for `filename` lives under `dir`.
///
/// Separators in `filename` are replaced, so the container always lands
/// directly in `dir`.
pub fn container_path(dir: &Path, filename: &str) -> PathBuf {
    dir.join(format!("{}.{}", file_stem(filename), CONTAINER_EXTENSION))
}

fn xml_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Xml(e.to_string())
}

/// An asset descriptor paired with its payload.
#[derive(Debug, Clone, Copy)]
pub struct BlobContainer<'a> {
    pub asset: &'a AssetDescriptor,
    pub data: &'a [u8],
}

impl<'a> BlobContainer<'a> {
    pub fn new(asset: &'a AssetDescriptor, data: &'a [u8]) -> Self {
        Self { asset, data }
    }

    /// Serialize the container.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(writer, b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_error)?;

        let id = self.asset.blob_id.to_string();
        let item_id = self.asset.item_id.to_string();
        let length = self.data.len().to_string();
        let mut root = BytesStart::new("blob");
        root.push_attribute(("id", id.as_str()));
        root.push_attribute(("itemId", item_id.as_str()));
        root.push_attribute(("filename", self.asset.filename.as_str()));
        root.push_attribute(("path", self.asset.path.as_str()));
        root.push_attribute(("length", length.as_str()));
        writer.write_event(Event::Start(root)).map_err(xml_error)?;

        writer
            .write_event(Event::Start(BytesStart::new("fields")))
            .map_err(xml_error)?;
        for attribute in &self.asset.attributes {
            let mut field = BytesStart::new("field");
            field.push_attribute(("name", attribute.name.as_str()));
            field.push_attribute(("value", attribute.value.as_str()));
            writer.write_event(Event::Empty(field)).map_err(xml_error)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("fields")))
            .map_err(xml_error)?;

        // Base64 never contains `]]>`, one section is enough.
        let encoded = general_purpose::STANDARD.encode(self.data);
        writer
            .write_event(Event::Start(BytesStart::new("data")))
            .map_err(xml_error)?;
        writer
            .write_event(Event::CData(BytesCData::new(encoded.as_str())))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("data")))
            .map_err(xml_error)?;

        writer
            .write_event(Event::End(BytesEnd::new("blob")))
            .map_err(xml_error)?;
        Ok(())
    }

    /// Serialize into a byte buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(self.data.len() * 4 / 3 + 512);
        self.write_to(&mut output)?;
        Ok(output)
    }

    /// Write the container to `dir`, creating it if needed.
    pub fn persist(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = container_path(dir, &self.asset.filename);
        std::fs::write(&path, self.to_bytes()?)?;
        Ok(path)
    }

    /// Extract the payload from a serialized container.
    pub fn decode_payload(container: &str) -> Result<Vec<u8>> {
        let start = container
            .find("<![CDATA[")
            .map(|i| i + "<![CDATA[".len())
            .ok_or_else(|| Error::Xml("container has no data section".into()))?;
        let end = container[start..]
            .find("]]>")
            .map(|i| start + i)
            .ok_or_else(|| Error::Xml("unterminated data section".into()))?;
        general_purpose::STANDARD
            .decode(&container[start..end])
            .map_err(|e| Error::Xml(e.to_string()))
    }
}
