use std::fmt;
use std::str::FromStr;

use crate::attributes::AttributeCategory;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    Vi,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Vi => "vi",
        }
    }

    pub fn all() -> [Language; 2] {
        [Self::En, Self::Vi]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "vi" => Ok(Self::Vi),
            other => Err(CoreError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Message keys shown by the flows and the terminal front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    Processing,
    ProcessingFaceAttributes,
    SubmittingToQueue,
    SubmittingFaceGeneration,
    Generating,
    GeneratingFromText,
    TextPromptFailed,
    GenerateFailed,
    GenericError,
    DefaultAttributes,
    PlaceholderText,
    Category(AttributeCategory),
}

impl Text {
    /// Looks the key up for `lang`, falling back to English.
    pub fn get(self, lang: Language) -> &'static str {
        match lang {
            Language::En => self.en(),
            Language::Vi => self.vi().unwrap_or_else(|| self.en()),
        }
    }

    fn en(self) -> &'static str {
        match self {
            Self::Processing => "Processing...",
            Self::ProcessingFaceAttributes => "Processing face attributes...",
            Self::SubmittingToQueue => "Submitting to queue...",
            Self::SubmittingFaceGeneration => "Submitting face generation...",
            Self::Generating => "Generating...",
            Self::GeneratingFromText => "Generating from text...",
            Self::TextPromptFailed => "Failed to generate image from text. Please try again.",
            Self::GenerateFailed => "Failed to generate face. Please try again.",
            Self::GenericError => "An error occurred",
            Self::DefaultAttributes => "All attributes are at default values",
            Self::PlaceholderText => "Select a face and adjust attributes to generate",
            Self::Category(category) => match category {
                AttributeCategory::Hair => "Hair",
                AttributeCategory::Facial => "Facial",
                AttributeCategory::FacialHair => "Facial Hair",
                AttributeCategory::MakeupAccessories => "Makeup & Accessories",
                AttributeCategory::General => "General",
            },
        }
    }

    fn vi(self) -> Option<&'static str> {
        let text = match self {
            Self::Processing => "Đang xử lý...",
            Self::ProcessingFaceAttributes => "Đang xử lý thuộc tính khuôn mặt...",
            Self::SubmittingToQueue => "Đang gửi vào hàng đợi...",
            Self::SubmittingFaceGeneration => "Đang gửi yêu cầu tạo khuôn mặt...",
            Self::Generating => "Đang tạo...",
            Self::GeneratingFromText => "Đang tạo từ văn bản...",
            Self::TextPromptFailed => "Không thể tạo ảnh từ văn bản. Vui lòng thử lại.",
            Self::GenerateFailed => "Không thể tạo khuôn mặt. Vui lòng thử lại.",
            Self::DefaultAttributes => "Tất cả thuộc tính đang ở giá trị mặc định",
            Self::PlaceholderText => "Chọn khuôn mặt và điều chỉnh thuộc tính để tạo ảnh",
            Self::Category(category) => match category {
                AttributeCategory::Hair => "Tóc",
                AttributeCategory::Facial => "Khuôn mặt",
                AttributeCategory::FacialHair => "Râu",
                AttributeCategory::MakeupAccessories => "Trang điểm & Phụ kiện",
                AttributeCategory::General => "Chung",
            },
            Self::GenericError => return None,
        };
        Some(text)
    }
}
