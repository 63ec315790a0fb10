use crate::error::RenderError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use notepress_types::to_win_ansi;
use std::io::Write;

/// Zlib-compresses `data` for a `FlateDecode` stream.
pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// In-memory PDF object graph with one shared resources dictionary.
///
/// Pages are appended in order; fonts and image XObjects are registered under
/// resource names and collected into the shared dictionary on `finish`.
pub struct PdfDocumentWriter {
    document: Document,
    pub pages_id: ObjectId,
    pub resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    fonts: Dictionary,
    xobjects: Dictionary,
}

impl Default for PdfDocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocumentWriter {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();
        Self {
            document,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            fonts: Dictionary::new(),
            xobjects: Dictionary::new(),
        }
    }

    pub fn new_object_id(&mut self) -> ObjectId {
        self.document.new_object_id()
    }

    pub fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        self.document.add_object(object)
    }

    pub fn set_object(&mut self, id: ObjectId, object: impl Into<Object>) {
        self.document.objects.insert(id, object.into());
    }

    pub fn register_font(&mut self, resource_name: &str, font_id: ObjectId) {
        self.fonts.set(resource_name.as_bytes(), font_id);
    }

    pub fn register_xobject(&mut self, resource_name: &str, xobject_id: ObjectId) {
        self.xobjects.set(resource_name.as_bytes(), xobject_id);
    }

    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    /// Compresses `content` and appends a page that draws it.
    pub fn add_page(&mut self, content: Content, page_width: f32, page_height: f32) -> Result<ObjectId, RenderError> {
        let compressed = deflate(&content.encode()?)?;
        let content_id = self.add_object(Stream::new(dictionary! { "Filter" => "FlateDecode" }, compressed));
        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page_width.into(), page_height.into()],
            "Contents" => content_id,
            "Resources" => self.resources_id,
        };
        let page_id = self.add_object(page_dict);
        self.page_ids.push(page_id);
        Ok(page_id)
    }

    /// Writes the catalog, page tree and info dictionary and serializes the document.
    pub fn finish(mut self, title: Option<&str>, outline_root: Option<ObjectId>) -> Result<Vec<u8>, RenderError> {
        let mut resources = dictionary! { "Font" => self.fonts };
        if !self.xobjects.is_empty() {
            resources.set("XObject", self.xobjects);
        }
        self.document.objects.insert(self.resources_id, resources.into());

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document.objects.insert(self.pages_id, pages_dict.into());

        let mut catalog = dictionary! { "Type" => "Catalog", "Pages" => self.pages_id };
        if let Some(outline_id) = outline_root {
            catalog.set("Outlines", outline_id);
            catalog.set("PageMode", "UseOutlines");
        }
        let catalog_id = self.document.add_object(catalog);
        self.document.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::string_literal("notepress"),
        };
        if let Some(title) = title {
            info.set("Title", Object::String(to_win_ansi(title), StringFormat::Literal));
        }
        let info_id = self.document.add_object(info);
        self.document.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        self.document.save_to(&mut buffer)?;
        Ok(buffer)
    }
}
