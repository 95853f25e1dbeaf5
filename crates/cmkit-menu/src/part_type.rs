//! Part types (equipment slots) and their classification.
//!
//! Menu containers name their slot with a string such as `"wear"` or
//! `"acckami"`. Names resolve case-insensitively; anything unknown becomes
//! [`PartType::NullMpn`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// The equipment slot or category a menu targets.
///
/// Discriminants match the values stored in the descriptor cache file.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    FromRepr,
    IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(i32)]
pub enum PartType {
    #[default]
    NullMpn = 0,

    // Face
    Head = 100,
    Facegloss,
    FolderMayu,
    Mayu,
    FolderMatsugeUp,
    MatsugeUp,
    FolderMatsugeLow,
    MatsugeLow,
    FolderFutae,
    Futae,
    FolderEye,
    Eye,
    EyeHi,
    EyeHiR,
    FolderEyewhite,
    Eyewhite,
    Nose,
    Hokuro,
    Lip,
    Accha,

    // Hair
    Hairf = 200,
    Hairr,
    Hairs,
    Hairt,
    Hairaho,
    Haircolor,

    // Body
    FolderSkin = 300,
    Skin,
    Chikubi,
    Chikubicolor,
    Acctatoo,
    Accnail,
    FolderUnderhair,
    Underhair,
    Body,
    Moza,

    // Clothing
    Acchat = 400,
    Headset,
    Wear,
    Skirt,
    Onepiece,
    Mizugi,
    Bra,
    Panz,
    Stkg,
    Shoes,

    // Accessories
    Acckami = 500,
    Megane,
    Acchead,
    Acchana,
    Accmimi,
    Glove,
    Acckubi,
    Acckubiwa,
    Acckamisub,
    Accnip,
    Accude,
    Accheso,
    Accashi,
    Accsenaka,
    Accshippo,
    Accvag,
    Accxxx,
    Accanl,

    // Sets
    SetBody = 600,
    SetMaidwear,
    SetMywear,
    SetUnderwear,
    SetHeadSlider,

    // Other
    Handitem = 700,
    KousokuUpper,
    KousokuLower,
    SeiekiNaka,
    SeiekiHara,
    SeiekiFace,
    SeiekiMune,
    SeiekiHip,
    SeiekiUde,
    SeiekiAshi,
}

/// Editor grouping of part types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PartCategory {
    #[default]
    None,
    Face,
    Hair,
    Body,
    Wear,
    Accessory,
    Set,
}

impl PartType {
    /// Look up a part type by name, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// The raw value used in the cache file.
    pub fn to_i32(self) -> i32 {
        self as i32
    }

    /// Convert a raw cache value back, mapping unknown values to `NullMpn`.
    pub fn from_i32(value: i32) -> Self {
        Self::from_repr(value).unwrap_or_default()
    }

    /// The canonical snake_case name.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The editor category, or [`PartCategory::None`] for slots the editor
    /// does not expose.
    pub fn category(self) -> PartCategory {
        use PartType::*;

        match self {
            Head | Facegloss | FolderMayu | FolderMatsugeUp | FolderMatsugeLow | FolderFutae
            | FolderEye | EyeHi | FolderEyewhite | Nose | Hokuro | Lip | Accha => {
                PartCategory::Face
            }
            Hairf | Hairr | Hairs | Hairt | Hairaho => PartCategory::Hair,
            FolderSkin | Chikubi | Acctatoo | FolderUnderhair | Body | Accnail => {
                PartCategory::Body
            }
            Acchat | Headset | Wear | Skirt | Onepiece | Mizugi | Bra | Panz | Stkg | Shoes => {
                PartCategory::Wear
            }
            Acckami | Megane | Acchead | Acchana | Accmimi | Glove | Acckubi | Acckubiwa
            | Acckamisub | Accnip | Accude | Accheso | Accashi | Accsenaka | Accshippo
            | Accvag | Accxxx | Accanl => PartCategory::Accessory,
            SetBody | SetMaidwear | SetMywear | SetUnderwear => PartCategory::Set,
            _ => PartCategory::None,
        }
    }

    /// Whether the editor lets the user pick menus of this type (sets included).
    pub fn is_editable(self) -> bool {
        self.category() != PartCategory::None
    }

    /// Whether menus of this type can be equipped (sets excluded).
    pub fn is_equippable(self) -> bool {
        !matches!(self.category(), PartCategory::None | PartCategory::Set)
    }

    /// Whether this slot is a folder that groups other slots.
    pub fn is_folder(self) -> bool {
        matches!(
            self,
            PartType::FolderFutae
                | PartType::FolderMatsugeLow
                | PartType::FolderMatsugeUp
                | PartType::FolderEye
                | PartType::FolderMayu
                | PartType::FolderSkin
                | PartType::FolderUnderhair
                | PartType::Chikubi
        )
    }
}

/// Resolves part-type names found in containers.
///
/// Hosts with their own slot table implement this; [`StandardPartTypes`]
/// uses the built-in [`PartType`] names.
pub trait PartTypeResolver: Send + Sync {
    /// Resolve `name`, returning [`PartType::NullMpn`] when it is unknown.
    fn resolve(&self, name: &str) -> PartType;
}

/// The built-in, case-insensitive part-type table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPartTypes;

impl PartTypeResolver for StandardPartTypes {
    fn resolve(&self, name: &str) -> PartType {
        PartType::from_name(name)
    }
}
