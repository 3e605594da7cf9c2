//! PDF Document wrapper

use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::widget::{self, WidgetInfo};
use crate::{Align, Font, PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// PDF Document wrapper providing high-level operations
///
/// Content operators are buffered per page and flushed once at save time,
/// so repeated insertions do not create orphan stream objects. Fonts are
/// embedded at save time as well, after the full set of drawn characters
/// is known.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Registered fonts by identifier
    fonts: HashMap<String, Font>,
    /// Current font identifier
    current_font: Option<String>,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Embedded fonts (font identifier -> PDF object ID)
    embedded_fonts: HashMap<String, ObjectId>,
    /// Page font resources (page number -> font identifier -> resource name)
    page_font_resources: HashMap<usize, HashMap<String, String>>,
    /// Next font resource number
    next_font_resource: u32,
    /// Embedded images (data hash -> PDF object ID)
    embedded_images: HashMap<u64, ObjectId>,
    /// Page image resources (page number -> resource name -> object ID)
    page_image_resources: HashMap<usize, HashMap<String, ObjectId>>,
    /// Next image resource number
    next_image_resource: u32,
    /// Buffered content operators per page
    page_content_buffer: HashMap<usize, Vec<u8>>,
}

impl PdfDocument {
    fn from_document(inner: Document) -> Self {
        Self {
            inner,
            fonts: HashMap::new(),
            current_font: None,
            current_font_size: 12.0,
            current_text_color: Color::default(),
            embedded_fonts: HashMap::new(),
            page_font_resources: HashMap::new(),
            next_font_resource: 1,
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            page_content_buffer: HashMap::new(),
        }
    }

    /// Open a PDF document from a file path
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("template.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_document(inner))
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_document(inner))
    }

    /// Create a new empty document with a single page
    pub fn new_with_page(width: f64, height: f64) -> Result<Self> {
        let mut inner = Document::with_version("1.5");
        let pages_id = inner.new_object_id();

        let page_id = inner.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ],
        };
        inner.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);

        Ok(Self::from_document(inner))
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Register a font under an identifier
    ///
    /// # Arguments
    /// * `name` - Font identifier (used in set_font)
    /// * `font` - Embedded TrueType data or a built-in base-14 font
    pub fn add_font(&mut self, name: &str, font: Font) -> Result<()> {
        if self.fonts.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }
        self.fonts.insert(name.to_string(), font);
        Ok(())
    }

    /// Set the current font and size
    pub fn set_font(&mut self, name: &str, size: f32) -> Result<()> {
        if !self.fonts.contains_key(name) {
            return Err(PdfError::FontNotFound(name.to_string()));
        }
        self.current_font = Some(name.to_string());
        self.current_font_size = size;
        Ok(())
    }

    /// Set only the font size (keeps the current font)
    pub fn set_font_size(&mut self, size: f32) -> Result<()> {
        if self.current_font.is_none() {
            return Err(PdfError::FontNotFound("no font set".to_string()));
        }
        self.current_font_size = size;
        Ok(())
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Measure a string with the current font and size
    pub fn text_width(&self, text: &str) -> Result<f64> {
        let name = self
            .current_font
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("no font set".to_string()))?;
        let font = self
            .fonts
            .get(name)
            .ok_or_else(|| PdfError::FontNotFound(name.clone()))?;
        Ok(font.text_width_points(text, self.current_font_size) as f64)
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate in points (from top)
    /// * `align` - Text alignment relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        // Nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let font_name = self
            .current_font
            .clone()
            .ok_or_else(|| PdfError::FontNotFound("no font set".to_string()))?;

        let (encoded, text_width) = {
            let font = self
                .fonts
                .get_mut(&font_name)
                .ok_or_else(|| PdfError::FontNotFound(font_name.clone()))?;
            font.note_usage(text);
            (
                font.encode_show_text(text),
                font.text_width_points(text, self.current_font_size),
            )
        };

        let font_resource = self.get_or_create_font_ref(&font_name, page)?;

        // Convert Y coordinate from top-origin to PDF bottom-origin
        let page_height = self.page_height(page)?;
        let pdf_y = page_height - y;

        let ctx = TextRenderContext {
            font_resource,
            font_size: self.current_font_size,
            color: self.current_text_color,
            x: x as f32,
            y: pdf_y as f32,
            text_width,
            align,
        };

        let operators = generate_text_operators(&ctx, &encoded);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Insert an image at a specific position, stretched to the given size
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate in points (from top)
    /// * `width` - Image width in points
    /// * `height` - Image height in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        let image_resource = self.get_or_create_image_ref(data, page)?;

        let page_height = self.page_height(page)?;
        let pdf_y = page_height - y - height;

        let operators = generate_image_operators(&image_resource, x, pdf_y, width, height);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Collect widget annotations on a page without mutating the document
    pub fn widgets(&self, page: usize) -> Result<Vec<WidgetInfo>> {
        let page_id = self.page_id(page)?;
        widget::collect_widgets(&self.inner, page_id)
    }

    /// Remove all widget annotations from a page
    ///
    /// Returns the number of widgets removed.
    pub fn remove_widgets(&mut self, page: usize) -> Result<usize> {
        let page_id = self.page_id(page)?;
        widget::strip_widgets(&mut self.inner, page_id)
    }

    /// Remove the /AcroForm entry from the document catalog
    ///
    /// Returns true if an entry was removed.
    pub fn remove_acroform(&mut self) -> bool {
        widget::remove_acroform(&mut self.inner)
    }

    /// Append a blank page with the given dimensions
    ///
    /// Returns the new page number (1-indexed).
    pub fn add_page(&mut self, width: f64, height: f64) -> Result<usize> {
        let pages_id = self.pages_root_id()?;

        let page_id = self.inner.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ],
        });

        let pages = self.inner.get_object_mut(pages_id)?.as_dict_mut()?;
        match pages.get_mut(b"Kids").and_then(|obj| obj.as_array_mut()) {
            Ok(kids) => kids.push(Object::Reference(page_id)),
            Err(_) => pages.set("Kids", vec![Object::Reference(page_id)]),
        }
        let count = pages
            .get(b"Count")
            .and_then(|obj| obj.as_i64())
            .unwrap_or(0);
        pages.set("Count", count + 1);

        Ok(self.page_count())
    }

    /// Append every page of another document to this one
    ///
    /// The source document's objects are renumbered past this document's ID
    /// space, inherited page attributes are materialized onto each page, and
    /// the pages are reparented into this document's page tree. Returns the
    /// number of pages appended.
    pub fn append_pages_from(&mut self, mut other: PdfDocument) -> Result<usize> {
        other.flush_content_buffers()?;
        other.embed_fonts()?;

        let src = &mut other.inner;
        src.renumber_objects_with(self.inner.max_id + 1);
        self.inner.max_id = src.max_id;

        let src_pages: Vec<ObjectId> = src.get_pages().values().copied().collect();

        // Page tree nodes of the source are dropped below, so attributes
        // inherited through that tree must be copied onto the leaves first.
        for &page_id in &src_pages {
            for key in [b"MediaBox".as_slice(), b"Resources", b"Rotate", b"CropBox"] {
                let already_present = src
                    .get_object(page_id)
                    .ok()
                    .and_then(|obj| obj.as_dict().ok())
                    .map(|dict| dict.has(key))
                    .unwrap_or(false);
                if already_present {
                    continue;
                }
                if let Some(value) = inherited_attribute(src, page_id, key) {
                    if let Ok(dict) = src
                        .get_object_mut(page_id)
                        .and_then(|obj| obj.as_dict_mut())
                    {
                        dict.set(key, value);
                    }
                }
            }
        }

        let pages_root = self.pages_root_id()?;

        for (id, obj) in std::mem::take(&mut src.objects) {
            let is_tree_node = obj
                .as_dict()
                .ok()
                .and_then(|dict| dict.get(b"Type").ok())
                .and_then(|t| t.as_name().ok())
                .map(|name| name == b"Catalog" || name == b"Pages")
                .unwrap_or(false);
            if is_tree_node {
                continue;
            }
            self.inner.objects.insert(id, obj);
        }

        for &page_id in &src_pages {
            if let Ok(dict) = self
                .inner
                .get_object_mut(page_id)
                .and_then(|obj| obj.as_dict_mut())
            {
                dict.set("Parent", Object::Reference(pages_root));
            }
        }

        let pages = self.inner.get_object_mut(pages_root)?.as_dict_mut()?;
        match pages.get_mut(b"Kids").and_then(|obj| obj.as_array_mut()) {
            Ok(kids) => {
                for &page_id in &src_pages {
                    kids.push(Object::Reference(page_id));
                }
            }
            Err(_) => {
                let kids: Vec<Object> = src_pages
                    .iter()
                    .map(|&id| Object::Reference(id))
                    .collect();
                pages.set("Kids", kids);
            }
        }
        let count = pages
            .get(b"Count")
            .and_then(|obj| obj.as_i64())
            .unwrap_or(0);
        pages.set("Count", count + src_pages.len() as i64);

        Ok(src_pages.len())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush_content_buffers()?;
        self.embed_fonts()?;

        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_content_buffers()?;
        self.embed_fonts()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Get page height in points
    ///
    /// Reads the MediaBox (or CropBox), following the parent inheritance
    /// chain if the page itself carries neither.
    pub fn page_height(&self, page: usize) -> Result<f64> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_media_box(page_id)?;
        extract_from_media_box(&media_box, 1, 3)
    }

    /// Get page width in points
    pub fn page_width(&self, page: usize) -> Result<f64> {
        let page_id = self.page_id(page)?;
        let media_box = self.get_inherited_media_box(page_id)?;
        extract_from_media_box(&media_box, 0, 2)
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Resolve the root /Pages node via the document catalog
    fn pages_root_id(&self) -> Result<ObjectId> {
        let root_id = match self.inner.trailer.get(b"Root") {
            Ok(Object::Reference(id)) => *id,
            _ => return Err(PdfError::ParseError("missing document catalog".to_string())),
        };
        let catalog = self.inner.get_object(root_id)?.as_dict()?;
        match catalog.get(b"Pages") {
            Ok(Object::Reference(id)) => Ok(*id),
            _ => Err(PdfError::ParseError(
                "catalog has no page tree".to_string(),
            )),
        }
    }

    /// Get MediaBox, following parent inheritance chain if needed
    fn get_inherited_media_box(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let mut current_id = page_id;

        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("page node is not a dictionary".to_string()))?;

            if let Ok(media_box) = dict.get(b"MediaBox").or_else(|_| dict.get(b"CropBox")) {
                let array = match media_box {
                    Object::Array(arr) => arr.clone(),
                    Object::Reference(ref_id) => self
                        .inner
                        .get_object(*ref_id)?
                        .as_array()
                        .map_err(|_| {
                            PdfError::ParseError("MediaBox reference is not an array".to_string())
                        })?
                        .clone(),
                    _ => {
                        return Err(PdfError::ParseError(
                            "MediaBox is not an array".to_string(),
                        ))
                    }
                };
                return Ok(array);
            }

            if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
                current_id = *parent_id;
                continue;
            }
            break;
        }

        // Fallback: assume A4
        Ok(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.28),
            Object::Real(841.89),
        ])
    }

    /// Get or create a font resource name for a specific page
    ///
    /// The font itself is embedded at save time, when the full character
    /// set is known; only the resource name is assigned here.
    fn get_or_create_font_ref(&mut self, font_name: &str, page: usize) -> Result<String> {
        let page_resources = self.page_font_resources.entry(page).or_default();

        if let Some(resource_name) = page_resources.get(font_name) {
            return Ok(resource_name.clone());
        }

        let resource_name = format!("F{}", self.next_font_resource);
        self.next_font_resource += 1;
        page_resources.insert(font_name.to_string(), resource_name.clone());

        Ok(resource_name)
    }

    /// Get or create an image resource for a specific page
    ///
    /// Images are deduplicated by hash of their data, so the same photo
    /// placed on several pages is embedded once.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        if !self.embedded_images.contains_key(&data_hash) {
            let xobject = ImageXObject::from_bytes(data)?;
            let object_id = self.inner.add_object(xobject.to_pdf_stream());
            self.embedded_images.insert(data_hash, object_id);
        }
        let object_id = self.embedded_images[&data_hash];

        let page_resources = self.page_image_resources.entry(page).or_default();
        for (name, id) in page_resources.iter() {
            if *id == object_id {
                return Ok(name.clone());
            }
        }

        let resource_name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;
        page_resources.insert(resource_name.clone(), object_id);

        self.add_image_to_page_resources(page, &resource_name, object_id)?;

        Ok(resource_name)
    }

    /// Add an image reference to a page's Resources dictionary
    fn add_image_to_page_resources(
        &mut self,
        page: usize,
        resource_name: &str,
        object_id: ObjectId,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;

        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("page object is not a dictionary".to_string()))?;

        let mut resources_dict = match page_dict.get(b"Resources").and_then(|r| r.as_dict()) {
            Ok(dict) => dict.clone(),
            Err(_) => Dictionary::new(),
        };
        let mut xobject_dict = match resources_dict.get(b"XObject").and_then(|x| x.as_dict()) {
            Ok(dict) => dict.clone(),
            Err(_) => Dictionary::new(),
        };

        xobject_dict.set(resource_name.as_bytes(), Object::Reference(object_id));
        resources_dict.set(b"XObject", Object::Dictionary(xobject_dict));

        let mut new_page_dict = page_dict.clone();
        new_page_dict.set(b"Resources", Object::Dictionary(resources_dict));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Embed all fonts referenced by any page
    fn embed_fonts(&mut self) -> Result<()> {
        self.embedded_fonts.clear();

        let mut used: Vec<String> = self
            .page_font_resources
            .values()
            .flat_map(|fonts| fonts.keys().cloned())
            .collect();
        used.sort();
        used.dedup();

        for name in used {
            let font = self
                .fonts
                .get(&name)
                .ok_or_else(|| PdfError::FontNotFound(name.clone()))?;

            let font_id = match font {
                Font::TrueType(data) => {
                    let objects = data.to_pdf_objects()?;
                    self.add_truetype_objects(objects)
                }
                Font::Builtin(builtin) => self.inner.add_object(builtin.to_font_dictionary()),
            };
            self.embedded_fonts.insert(name, font_id);
        }

        self.finalize_page_font_resources()?;

        Ok(())
    }

    /// Wire up the object graph of an embedded TrueType font
    fn add_truetype_objects(&mut self, objects: crate::font::FontObjects) -> ObjectId {
        let font_file_id = self.inner.add_object(objects.font_file_stream);

        let mut font_descriptor = objects.font_descriptor;
        font_descriptor.set("FontFile2", Object::Reference(font_file_id));
        let font_descriptor_id = self.inner.add_object(font_descriptor);

        let mut cid_font = objects.cid_font;
        cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
        let cid_font_id = self.inner.add_object(cid_font);

        let tounicode_id = self.inner.add_object(objects.tounicode_stream);

        let mut type0_font = objects.type0_font;
        type0_font.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        );
        type0_font.set("ToUnicode", Object::Reference(tounicode_id));

        self.inner.add_object(type0_font)
    }

    /// Add font references to the Resources of every page that uses them
    fn finalize_page_font_resources(&mut self) -> Result<()> {
        let page_resources: Vec<(usize, Vec<(String, String)>)> = self
            .page_font_resources
            .iter()
            .map(|(&page, fonts)| {
                let list: Vec<_> = fonts
                    .iter()
                    .map(|(name, resource)| (name.clone(), resource.clone()))
                    .collect();
                (page, list)
            })
            .collect();

        for (page, fonts) in page_resources {
            if fonts.is_empty() {
                continue;
            }

            let page_id = self.page_id(page)?;
            let page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("page object is not a dictionary".to_string()))?;

            let mut resources_dict = match page_dict.get(b"Resources").and_then(|r| r.as_dict()) {
                Ok(dict) => dict.clone(),
                Err(_) => Dictionary::new(),
            };
            let mut font_dict = match resources_dict.get(b"Font").and_then(|f| f.as_dict()) {
                Ok(dict) => dict.clone(),
                Err(_) => Dictionary::new(),
            };

            for (font_name, resource_name) in &fonts {
                let font_ref = self
                    .embedded_fonts
                    .get(font_name)
                    .ok_or_else(|| PdfError::FontNotFound(font_name.clone()))?;
                font_dict.set(resource_name.as_bytes(), Object::Reference(*font_ref));
            }

            resources_dict.set(b"Font", Object::Dictionary(font_dict));

            let mut new_page_dict = page_dict.clone();
            new_page_dict.set(b"Resources", Object::Dictionary(resources_dict));
            self.inner.objects.insert(page_id, new_page_dict.into());
        }

        Ok(())
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers: Vec<(usize, Vec<u8>)> = self.page_content_buffer.drain().collect();

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content to a page's content stream
    ///
    /// Existing content (single stream, reference, or array of streams) is
    /// decompressed and concatenated so the page ends with one stream.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let (existing_content, page_dict_clone) = {
            let page_dict = self
                .inner
                .get_object(page_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("page object is not a dictionary".to_string()))?;

            let existing = match page_dict.get(b"Contents") {
                Ok(Object::Stream(stream)) => stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone()),
                Ok(Object::Reference(ref_id)) => {
                    if let Ok(Object::Stream(stream)) = self.inner.get_object(*ref_id) {
                        stream
                            .decompressed_content()
                            .unwrap_or_else(|_| stream.content.clone())
                    } else {
                        Vec::new()
                    }
                }
                Ok(Object::Array(arr)) => {
                    let mut combined = Vec::new();
                    for obj in arr {
                        let stream = match obj {
                            Object::Reference(ref_id) => {
                                match self.inner.get_object(*ref_id) {
                                    Ok(Object::Stream(stream)) => Some(stream),
                                    _ => None,
                                }
                            }
                            Object::Stream(stream) => Some(stream),
                            _ => None,
                        };
                        if let Some(stream) = stream {
                            let data = stream
                                .decompressed_content()
                                .unwrap_or_else(|_| stream.content.clone());
                            combined.extend_from_slice(&data);
                            // Operators from separate streams are separated
                            // by whitespace per the PDF spec
                            combined.push(b'\n');
                        }
                    }
                    combined
                }
                _ => Vec::new(),
            };

            (existing, page_dict.clone())
        };

        let mut new_content = existing_content;
        new_content.extend_from_slice(content);

        let stream_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), new_content));

        let mut new_page_dict = page_dict_clone;
        new_page_dict.set(b"Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, new_page_dict.into());

        Ok(())
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }
}

/// Look up a page attribute through the Parent chain
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current_id = page_id;
    for _ in 0..10 {
        let dict = doc.get_object(current_id).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            let value = match value {
                Object::Reference(ref_id) => doc.get_object(*ref_id).ok()?.clone(),
                other => other.clone(),
            };
            return Some(value);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current_id = *parent_id,
            _ => break,
        }
    }
    None
}

fn extract_from_media_box(media_box: &[Object], low: usize, high: usize) -> Result<f64> {
    if media_box.len() < 4 {
        return Err(PdfError::ParseError("invalid MediaBox format".to_string()));
    }

    let value_at = |index: usize| -> Result<f64> {
        media_box[index]
            .as_f32()
            .map(|v| v as f64)
            .ok()
            .or_else(|| media_box[index].as_i64().ok().map(|v| v as f64))
            .ok_or_else(|| PdfError::ParseError("invalid MediaBox entry".to_string()))
    };

    Ok(value_at(high)? - value_at(low)?)
}
