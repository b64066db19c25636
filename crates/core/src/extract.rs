//! Readable-content extraction.
//!
//! The actual readability heuristic is an external collaborator (the
//! [`readability`] crate); this module wraps it behind the [`Article`] type
//! and the "no article" error condition, and owns the append operation used
//! when pagination stitches continuation pages onto the first page's result.

use serde::Serialize;
use url::Url;

use crate::{AuditoError, Result};

/// The extracted result of one page, and the accumulator for a whole
/// paginated article.
///
/// When pagination continues, a later page's `content` and `text_content`
/// are appended onto the first page's article via [`Article::absorb`]; the
/// first page's title is kept.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    /// Article title, taken from the first page.
    pub title: String,
    /// Extracted readable content as sanitized HTML.
    pub content: String,
    /// Plain text version of the content.
    pub text_content: String,
    /// URL of the first page this article was extracted from.
    pub source_url: String,
}

impl Article {
    /// Appends a continuation page's content and text onto this article.
    pub fn absorb(&mut self, continuation: Article) {
        self.content.push_str(&continuation.content);
        self.text_content.push_str(&continuation.text_content);
    }
}

/// Extracts the readable article from decoded page markup.
///
/// `base_url` is used by the extractor to resolve relative asset links
/// inside the content. A page with no extractable main content yields
/// [`AuditoError::NoArticle`].
pub fn extract_article(html: &str, base_url: &Url) -> Result<Article> {
    let mut reader = html.as_bytes();
    let product = readability::extractor::extract(&mut reader, base_url)
        .map_err(|e| AuditoError::NoArticle(format!("{e:?}")))?;

    if product.text.trim().is_empty() {
        return Err(AuditoError::NoArticle("page has no readable text".to_string()));
    }

    Ok(Article {
        title: product.title,
        content: product.content,
        text_content: product.text,
        source_url: base_url.to_string(),
    })
}
