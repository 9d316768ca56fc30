// block.rs
//
// Copyright (c) 2019-2025  Douglas Lau
//
//! Low-level GIF blocks, as they appear in the byte stream

/// Number of channels in a color table entry
pub const CHANNELS: usize = 3;

/// Color table existence flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableExistence {
    Absent,
    Present,
}

/// Color table ordering flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableOrdering {
    NotSorted,
    Sorted,
}

/// Color table configuration, as stored in screen / image descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTableConfig {
    existence: ColorTableExistence,
    ordering: ColorTableOrdering,
    table_len: usize, // power of 2, 2...256
}

impl Default for ColorTableConfig {
    fn default() -> Self {
        ColorTableConfig {
            existence: ColorTableExistence::Absent,
            ordering: ColorTableOrdering::NotSorted,
            table_len: 2,
        }
    }
}

impl ColorTableConfig {
    /// Bits of the size field in descriptor flags
    const SIZE_FIELD: u8 = 0b0000_0111;

    /// Create a new color table config.
    ///
    /// The table length is rounded up to a length which can be stored in
    /// the size field (2, 4, 8, ... 256).
    pub fn new(
        existence: ColorTableExistence,
        ordering: ColorTableOrdering,
        table_len: usize,
    ) -> Self {
        let table_len = table_len.clamp(2, 256).next_power_of_two();
        ColorTableConfig {
            existence,
            ordering,
            table_len,
        }
    }

    /// Unpack from descriptor flags.
    ///
    /// `present` and `sorted` are the flag bits used by the descriptor; the
    /// size field is always the low 3 bits.
    fn from_flags(flags: u8, present: u8, sorted: u8) -> Self {
        let existence = match flags & present {
            0 => ColorTableExistence::Absent,
            _ => ColorTableExistence::Present,
        };
        let ordering = match flags & sorted {
            0 => ColorTableOrdering::NotSorted,
            _ => ColorTableOrdering::Sorted,
        };
        ColorTableConfig {
            existence,
            ordering,
            table_len: 2 << (flags & Self::SIZE_FIELD),
        }
    }

    /// Pack into descriptor flag bits (see `from_flags`)
    fn to_flags(self, present: u8, sorted: u8) -> u8 {
        let mut flags = self.size_field();
        if self.existence == ColorTableExistence::Present {
            flags |= present;
        }
        if self.ordering == ColorTableOrdering::Sorted {
            flags |= sorted;
        }
        flags
    }

    pub fn existence(&self) -> ColorTableExistence {
        self.existence
    }

    pub fn ordering(&self) -> ColorTableOrdering {
        self.ordering
    }

    /// Get the number of entries (zero if absent)
    pub fn len(&self) -> usize {
        match self.existence {
            ColorTableExistence::Absent => 0,
            ColorTableExistence::Present => self.table_len,
        }
    }

    /// Value of the 3-bit size field
    fn size_field(&self) -> u8 {
        (self.table_len.trailing_zeros() - 1) as u8
    }

    /// Get the size of the table in bytes
    pub fn size_bytes(&self) -> usize {
        self.len() * CHANNELS
    }
}

/// Frame disposal method
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// No disposal specified
    NoAction,
    /// Leave frame in place
    Keep,
    /// Restore to background color
    Background,
    /// Restore to previous frame
    Previous,
    /// Reserved value
    Reserved(u8),
}

impl Default for DisposalMethod {
    fn default() -> Self {
        DisposalMethod::NoAction
    }
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            0 => NoAction,
            1 => Keep,
            2 => Background,
            3 => Previous,
            n => Reserved(n),
        }
    }
}

impl From<DisposalMethod> for u8 {
    fn from(d: DisposalMethod) -> Self {
        use self::DisposalMethod::*;
        match d {
            NoAction => 0,
            Keep => 1,
            Background => 2,
            Previous => 3,
            Reserved(n) => n & 0b0111,
        }
    }
}

/// Block codes, including implicit ones (without a signature byte)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    Header_,
    LogicalScreenDesc_,
    GlobalColorTable_,
    Extension_,
    ImageDesc_,
    LocalColorTable_,
    ImageData_,
    Trailer_,
}

impl BlockCode {
    /// Get block code from a signature byte
    pub fn from_u8(t: u8) -> Option<Self> {
        use self::BlockCode::*;
        match t {
            b',' => Some(ImageDesc_), // (0x2C) Image separator
            b'!' => Some(Extension_), // (0x21) Extension introducer
            b';' => Some(Trailer_),   // (0x3B) GIF trailer
            _ => None,
        }
    }

    /// Get the signature bytes
    pub fn signature(self) -> &'static [u8] {
        use self::BlockCode::*;
        match self {
            ImageDesc_ => b",",
            Extension_ => b"!",
            Trailer_ => b";",
            _ => &[],
        }
    }

    /// Get the fixed size of the block (not counting sub-blocks)
    pub fn size(self) -> usize {
        use self::BlockCode::*;
        match self {
            Header_ => 6,
            LogicalScreenDesc_ => 7,
            ImageDesc_ => 10,
            Trailer_ => 1,
            Extension_ => 2, // +sub-blocks
            ImageData_ => 1, // +sub-blocks
            GlobalColorTable_ | LocalColorTable_ => 0,
        }
    }
}

/// Extension labels
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExtensionCode {
    PlainText_,
    GraphicControl_,
    Comment_,
    Application_,
    Unknown_(u8),
}

impl From<u8> for ExtensionCode {
    fn from(n: u8) -> Self {
        use self::ExtensionCode::*;
        match n {
            0x01 => PlainText_,
            0xF9 => GraphicControl_,
            0xFE => Comment_,
            0xFF => Application_,
            _ => Unknown_(n),
        }
    }
}

impl From<ExtensionCode> for u8 {
    fn from(t: ExtensionCode) -> Self {
        use self::ExtensionCode::*;
        match t {
            PlainText_ => 0x01,
            GraphicControl_ => 0xF9,
            Comment_ => 0xFE,
            Application_ => 0xFF,
            Unknown_(n) => n,
        }
    }
}

/// Header block ("GIF87a" or "GIF89a")
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    version: [u8; 3],
}

impl Default for Header {
    fn default() -> Self {
        Header::with_version(*b"89a")
    }
}

impl Header {
    pub fn with_version(version: [u8; 3]) -> Self {
        Header { version }
    }

    pub fn version(&self) -> [u8; 3] {
        self.version
    }
}

/// Logical Screen Descriptor block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: u8,
    background_color_idx: u8, // index into global color table
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    const GLOBAL_TABLE: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const GLOBAL_SORTED: u8 = 0b0000_1000;

    pub fn with_screen_width(mut self, screen_width: u16) -> Self {
        self.screen_width = screen_width;
        self
    }

    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }

    pub fn with_screen_height(mut self, screen_height: u16) -> Self {
        self.screen_height = screen_height;
        self
    }

    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Set the color resolution, in bits per primary color (1-8)
    pub fn with_color_resolution(mut self, bits: u8) -> Self {
        let res = (bits.clamp(1, 8) - 1) << 4;
        self.flags = (self.flags & !Self::COLOR_RESOLUTION) | res;
        self
    }

    /// Get the color resolution, in bits per primary color
    pub fn color_resolution(&self) -> u8 {
        ((self.flags & Self::COLOR_RESOLUTION) >> 4) + 1
    }

    /// Get the global color table config
    pub fn color_table_config(&self) -> ColorTableConfig {
        ColorTableConfig::from_flags(
            self.flags,
            Self::GLOBAL_TABLE,
            Self::GLOBAL_SORTED,
        )
    }

    /// Set the global color table config
    pub fn with_color_table_config(mut self, tbl: &ColorTableConfig) -> Self {
        self.flags = (self.flags & Self::COLOR_RESOLUTION)
            | tbl.to_flags(Self::GLOBAL_TABLE, Self::GLOBAL_SORTED);
        self
    }

    pub fn with_background_color_idx(mut self, idx: u8) -> Self {
        self.background_color_idx = idx;
        self
    }

    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }

    pub fn with_pixel_aspect_ratio(mut self, ratio: u8) -> Self {
        self.pixel_aspect_ratio = ratio;
        self
    }

    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
}

/// Global Color Table block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalColorTable {
    colors: Vec<u8>,
}

impl GlobalColorTable {
    pub fn with_colors(colors: &[u8]) -> Self {
        assert_eq!(colors.len() % CHANNELS, 0);
        GlobalColorTable {
            colors: colors.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len() / CHANNELS
    }

    pub fn colors(&self) -> &[u8] {
        &self.colors
    }
}

/// Graphic Control extension block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphicControl {
    flags: u8,
    delay_time_cs: u16, // delay in centiseconds (hundredths of a second)
    transparent_color_idx: u8,
}

impl GraphicControl {
    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const USER_INPUT: u8 = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    pub fn set_flags(&mut self, flags: u8) {
        self.flags = flags;
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn disposal_method(&self) -> DisposalMethod {
        ((self.flags & Self::DISPOSAL_METHOD) >> 2).into()
    }

    pub fn set_disposal_method(&mut self, method: DisposalMethod) {
        let d: u8 = method.into();
        self.flags = (self.flags & !Self::DISPOSAL_METHOD) | (d << 2);
    }

    pub fn user_input(&self) -> bool {
        self.flags & Self::USER_INPUT != 0
    }

    pub fn set_user_input(&mut self, user_input: bool) {
        let u = (user_input as u8) << 1;
        self.flags = (self.flags & !Self::USER_INPUT) | u;
    }

    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    pub fn set_delay_time_cs(&mut self, delay_time_cs: u16) {
        self.delay_time_cs = delay_time_cs;
    }

    /// Get the transparent color index, if the flag is set
    pub fn transparent_color(&self) -> Option<u8> {
        if self.flags & Self::TRANSPARENT_COLOR != 0 {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }

    /// Raw transparent color index (whether or not the flag is set)
    pub fn transparent_color_idx(&self) -> u8 {
        self.transparent_color_idx
    }

    pub fn set_transparent_color_idx(&mut self, idx: u8) {
        self.transparent_color_idx = idx;
    }

    pub fn set_transparent_color(&mut self, transparent_color: Option<u8>) {
        match transparent_color {
            Some(t) => {
                self.flags |= Self::TRANSPARENT_COLOR;
                self.transparent_color_idx = t;
            }
            None => {
                self.flags &= !Self::TRANSPARENT_COLOR;
                self.transparent_color_idx = 0;
            }
        }
    }
}

/// Extension block which is skipped (plain text, comment, application...)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extension {
    code: ExtensionCode,
    data_len: usize, // total bytes in skipped sub-blocks
}

impl Extension {
    pub fn new(code: ExtensionCode) -> Self {
        Extension { code, data_len: 0 }
    }

    pub fn code(&self) -> ExtensionCode {
        self.code
    }

    /// Account for one skipped sub-block
    pub fn skip_sub_block(&mut self, len: usize) {
        self.data_len += len;
    }

    /// Get the number of skipped data bytes
    pub fn data_len(&self) -> usize {
        self.data_len
    }
}

/// Image Descriptor block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageDesc {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    flags: u8,
}

impl ImageDesc {
    const LOCAL_TABLE: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const LOCAL_SORTED: u8 = 0b0010_0000;
    const RESERVED: u8 = 0b0001_1000;

    pub fn with_left(mut self, left: u16) -> Self {
        self.left = left;
        self
    }

    pub fn left(&self) -> u16 {
        self.left
    }

    pub fn with_top(mut self, top: u16) -> Self {
        self.top = top;
        self
    }

    pub fn top(&self) -> u16 {
        self.top
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn with_height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        if interlaced {
            self.flags |= Self::INTERLACED;
        } else {
            self.flags &= !Self::INTERLACED;
        }
        self
    }

    pub fn interlaced(&self) -> bool {
        (self.flags & Self::INTERLACED) != 0
    }

    /// Get the local color table config
    pub fn color_table_config(&self) -> ColorTableConfig {
        ColorTableConfig::from_flags(
            self.flags,
            Self::LOCAL_TABLE,
            Self::LOCAL_SORTED,
        )
    }

    /// Set the local color table config (interlace flag is kept)
    pub fn with_color_table_config(mut self, tbl: &ColorTableConfig) -> Self {
        self.flags = (self.flags & (Self::INTERLACED | Self::RESERVED))
            | tbl.to_flags(Self::LOCAL_TABLE, Self::LOCAL_SORTED);
        self
    }

    /// Get the image size, in pixels
    pub fn image_sz(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Local Color Table block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalColorTable {
    colors: Vec<u8>,
}

impl LocalColorTable {
    pub fn with_colors(colors: &[u8]) -> Self {
        assert_eq!(colors.len() % CHANNELS, 0);
        LocalColorTable {
            colors: colors.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len() / CHANNELS
    }

    pub fn colors(&self) -> &[u8] {
        &self.colors
    }
}

/// Image Data block (uncompressed color indices)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    min_code_size: u8,
    image_sz: usize,
    data: Vec<u8>,
}

impl ImageData {
    /// Create a new image data block for `image_sz` pixels
    pub fn new(image_sz: usize, min_code_size: u8) -> Self {
        ImageData {
            min_code_size,
            image_sz,
            data: Vec::with_capacity(image_sz),
        }
    }

    /// Create an image data block from color indices.
    ///
    /// The minimum code size is chosen to fit the largest index, as well
    /// as a color table with `table_len` entries.
    pub fn with_indices(indices: &[u8], table_len: usize) -> Self {
        let max = indices.iter().copied().max().map_or(0, usize::from);
        let needed = table_len.max(max + 1).max(4);
        let bits = usize::BITS - (needed - 1).leading_zeros();
        let min_code_size = u8::try_from(bits).unwrap_or(8).min(8);
        ImageData {
            min_code_size,
            image_sz: indices.len(),
            data: indices.to_vec(),
        }
    }

    /// Check whether all pixels have been added
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.image_sz
    }

    /// Add decompressed pixel data, discarding anything past the image size
    pub fn add_data(&mut self, data: &[u8]) {
        let rem = self.image_sz - self.data.len();
        if data.len() <= rem {
            self.data.extend_from_slice(data);
        } else {
            self.data.extend_from_slice(&data[..rem]);
            warn!("Extra image data: {} bytes", data.len() - rem);
        }
    }

    /// Get the LZW minimum code size
    pub fn min_code_size(&self) -> u8 {
        self.min_code_size.max(2)
    }

    /// Get the color index data
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Trailer block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trailer {}

/// One block of a GIF file
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Header(Header),
    LogicalScreenDesc(LogicalScreenDesc),
    GlobalColorTable(GlobalColorTable),
    GraphicControl(GraphicControl),
    Extension(Extension),
    ImageDesc(ImageDesc),
    LocalColorTable(LocalColorTable),
    ImageData(ImageData),
    Trailer(Trailer),
}

impl Block {
    /// Check whether the block is followed by sub-blocks
    pub fn has_sub_blocks(&self) -> bool {
        matches!(
            self,
            Block::GraphicControl(_) | Block::Extension(_) | Block::ImageData(_)
        )
    }
}

/// Wrap each block struct into its `Block` variant
macro_rules! block_from {
    ($($name:ident),*) => {
        $(
            impl From<$name> for Block {
                fn from(b: $name) -> Self {
                    Block::$name(b)
                }
            }
        )*
    };
}

block_from!(
    Header,
    LogicalScreenDesc,
    GlobalColorTable,
    GraphicControl,
    Extension,
    ImageDesc,
    LocalColorTable,
    ImageData,
    Trailer
);

/// Blocks at the start of a GIF file, before any image
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Preamble {
    pub header: Header,
    pub logical_screen_desc: LogicalScreenDesc,
    pub global_color_table: Option<GlobalColorTable>,
}

impl Preamble {
    pub fn screen_width(&self) -> u16 {
        self.logical_screen_desc.screen_width()
    }

    pub fn screen_height(&self) -> u16 {
        self.logical_screen_desc.screen_height()
    }
}

/// Blocks making up one image ("saved image")
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBlocks {
    pub graphic_control_ext: Option<GraphicControl>,
    pub image_desc: ImageDesc,
    pub local_color_table: Option<LocalColorTable>,
    pub image_data: ImageData,
}

impl ImageBlocks {
    pub fn new(
        graphic_control_ext: Option<GraphicControl>,
        image_desc: ImageDesc,
        local_color_table: Option<LocalColorTable>,
        image_data: ImageData,
    ) -> Self {
        ImageBlocks {
            graphic_control_ext,
            image_desc,
            local_color_table,
            image_data,
        }
    }
}
