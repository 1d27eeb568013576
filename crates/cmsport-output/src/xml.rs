//! XML rendition of a group.
//!
//! ```xml
//! <items>
//!   <item id="..." type="Pages" name="home" path="/content/home">
//!     <fields>
//!       <field name="Title" value="Home"/>
//!       <field name="Body"><![CDATA[<p>Hi</p>]]></field>
//!       <field name="Tags">
//!         <refs>
//!           <item id="..." name="news" path="...">...</item>
//!         </refs>
//!       </field>
//!     </fields>
//!     <blobrefs>
//!       <blob id="..." itemId="..." filename="logo.png" path="/media/logo"/>
//!     </blobrefs>
//!   </item>
//! </items>
//! ```

use std::io::Write;

use cmsport_resolve::{AssetDescriptor, Group, ResolvedField, ResolvedItem};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::{Error, Result};

/// Render a group as an XML document.
pub fn group_to_xml(group: &Group) -> Result<String> {
    let mut output = Vec::new();
    write_group_xml(group, &mut output)?;
    String::from_utf8(output).map_err(|e| Error::Utf8(e.to_string()))
}

/// Write a group as XML.
pub fn write_group_xml<W: Write>(group: &Group, writer: W) -> Result<()> {
    let mut context = XmlContext {
        writer: Writer::new_with_indent(writer, b' ', 2),
    };

    context.event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    context.event(Event::Start(BytesStart::new("items")))?;
    for item in group.items() {
        context.write_item(item)?;
    }
    context.event(Event::End(BytesEnd::new("items")))
}

struct XmlContext<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlContext<W> {
    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::Xml(e.to_string()))
    }

    fn write_item(&mut self, item: &ResolvedItem) -> Result<()> {
        let id = item.id.to_string();
        let mut start = BytesStart::new("item");
        start.push_attribute(("id", id.as_str()));
        if !item.template.is_empty() {
            start.push_attribute(("type", item.template.as_str()));
        }
        start.push_attribute(("name", item.name.as_str()));
        start.push_attribute(("path", item.path.as_str()));
        self.event(Event::Start(start))?;

        if !item.fields.is_empty() {
            self.event(Event::Start(BytesStart::new("fields")))?;
            for field in &item.fields {
                self.write_field(field)?;
            }
            self.event(Event::End(BytesEnd::new("fields")))?;
        }

        if !item.assets.is_empty() {
            self.event(Event::Start(BytesStart::new("blobrefs")))?;
            for asset in &item.assets {
                self.write_blob_ref(asset)?;
            }
            self.event(Event::End(BytesEnd::new("blobrefs")))?;
        }

        self.event(Event::End(BytesEnd::new("item")))
    }

    fn write_field(&mut self, field: &ResolvedField) -> Result<()> {
        let mut start = BytesStart::new("field");
        start.push_attribute(("name", field.name.as_str()));

        if !field.html && field.references.is_empty() {
            start.push_attribute(("value", field.value.as_str()));
            return self.event(Event::Empty(start));
        }

        self.event(Event::Start(start))?;
        if field.html {
            self.write_cdata(&field.value)?;
        }
        if !field.references.is_empty() {
            self.event(Event::Start(BytesStart::new("refs")))?;
            for item in &field.references {
                self.write_item(item)?;
            }
            self.event(Event::End(BytesEnd::new("refs")))?;
        }
        self.event(Event::End(BytesEnd::new("field")))
    }

    fn write_blob_ref(&mut self, asset: &AssetDescriptor) -> Result<()> {
        let blob_id = asset.blob_id.to_string();
        let item_id = asset.item_id.to_string();
        let mut blob = BytesStart::new("blob");
        blob.push_attribute(("id", blob_id.as_str()));
        blob.push_attribute(("itemId", item_id.as_str()));
        blob.push_attribute(("filename", asset.filename.as_str()));
        blob.push_attribute(("path", asset.path.as_str()));
        self.event(Event::Empty(blob))
    }

    /// CDATA can't contain `]]>`, so split there into adjacent sections.
    fn write_cdata(&mut self, text: &str) -> Result<()> {
        let mut rest = text;
        while let Some(pos) = rest.find("]]>") {
            self.event(Event::CData(BytesCData::new(&rest[..pos + 2])))?;
            rest = &rest[pos + 2..];
        }
        self.event(Event::CData(BytesCData::new(rest)))
    }
}
