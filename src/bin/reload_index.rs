//! Rebuild the ChromaDB collection from the structured EWG dataset and the
//! per-product embedding files, attaching purchase-link metadata.
//!
//! Usage: reload-index [STRUCTURED_JSONL] [EMBEDDINGS_DIR]
//! Paths default to the container layout used in deployment.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use skincare_ai_api::config::Config;
use skincare_ai_api::services::chroma::{AddRequest, ChromaClient};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const DEFAULT_STRUCTURED: &str =
    "/app/backend/input-datasets/structured/ewg_face_label_structured.jsonl";
const DEFAULT_EMBEDDINGS_DIR: &str = "/app/backend/input-datasets/outputs";
const EMBEDDING_FILE_PREFIX: &str = "embeddings-char-split-";

#[derive(Debug, Deserialize)]
struct StructuredRecord {
    #[serde(default)]
    title: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    buy_button_urls: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct ProductMeta {
    brand: String,
    category: String,
    amazon_url: Option<String>,
    ewg_url: String,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRecord {
    #[serde(default)]
    chunk: String,
    #[serde(default)]
    book: Option<String>,
    #[serde(default)]
    embedding: Vec<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let structured_path = args.next().unwrap_or_else(|| DEFAULT_STRUCTURED.to_string());
    let embeddings_dir = args
        .next()
        .unwrap_or_else(|| DEFAULT_EMBEDDINGS_DIR.to_string());

    let config = Config::from_env();
    let chroma = ChromaClient::new(
        &config.chromadb_url(),
        &config.chroma_collection,
        config.retrieval_timeout_secs,
    )?;

    println!(
        "{}",
        style("Starting ChromaDB reload with purchase links...").bold()
    );

    let product_map = load_structured_data(&structured_path)?;
    println!("Loaded {} products with metadata", product_map.len());

    let collection_id = chroma
        .recreate_collection()
        .await
        .context("Failed to recreate collection")?;
    println!("Created new collection: {}", chroma.collection_name());

    let embedding_files = list_embedding_files(&embeddings_dir)?;
    println!("Found {} embedding files", embedding_files.len());

    let progress = ProgressBar::new(embedding_files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} files ({msg} chunks)"),
    );

    let mut total_loaded = 0usize;
    let mut products_with_links = 0usize;
    let mut products_without_links = 0usize;

    for (file_index, path) in embedding_files.iter().enumerate() {
        let product_name = product_name_from_filename(path);
        let records = load_embedding_records(path)?;

        let meta = product_map.get(&product_name).cloned().unwrap_or_default();
        if meta.amazon_url.is_some() {
            products_with_links += 1;
        } else {
            products_without_links += 1;
        }

        let mut request = AddRequest {
            ids: Vec::with_capacity(records.len()),
            embeddings: Vec::with_capacity(records.len()),
            documents: Vec::with_capacity(records.len()),
            metadatas: Vec::with_capacity(records.len()),
        };

        for (line_index, record) in records.into_iter().enumerate() {
            request
                .ids
                .push(format!("{:04}-{:04}", file_index, line_index));
            request.documents.push(record.chunk);
            request.embeddings.push(record.embedding);
            request
                .metadatas
                .push(chunk_metadata(&product_name, record.book.as_deref(), &meta));
        }

        if !request.ids.is_empty() {
            total_loaded += request.ids.len();
            chroma
                .add(&collection_id, &request)
                .await
                .with_context(|| format!("Failed to add chunks from {:?}", path))?;
        }

        progress.set_message(total_loaded.to_string());
        progress.inc(1);
    }
    progress.finish();

    let count = chroma.count(&collection_id).await?;

    println!("\n{}", style("=== Reload Complete ===").green().bold());
    println!("Total chunks loaded: {}", total_loaded);
    println!("Products with Amazon links: {}", products_with_links);
    println!("Products without links: {}", products_without_links);
    println!("Collection count: {}", count);

    Ok(())
}

/// Build the product-name -> metadata map from the structured EWG dataset.
fn load_structured_data(path: &str) -> Result<HashMap<String, ProductMeta>> {
    println!("Loading structured data from {}...", path);
    let file =
        File::open(path).with_context(|| format!("Failed to open structured data {}", path))?;

    let mut product_map = HashMap::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: StructuredRecord =
            serde_json::from_str(&line).context("Malformed structured data line")?;

        product_map.insert(
            record.title.clone(),
            ProductMeta {
                brand: record.brand,
                category: record.category,
                amazon_url: record.buy_button_urls.into_iter().next(),
                ewg_url: record.url,
            },
        );
    }

    Ok(product_map)
}

fn list_embedding_files(dir: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read embeddings directory {}", dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(EMBEDDING_FILE_PREFIX) && n.ends_with(".jsonl"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn load_embedding_records(path: &Path) -> Result<Vec<EmbeddingRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line).context("Malformed embedding line")?);
    }
    Ok(records)
}

/// Extract the product name from an embedding filename:
/// `embeddings-char-split-0000-Cliganic 100% Pure & Natural Neem Oil.jsonl`
/// -> `Cliganic 100% Pure & Natural Neem Oil`.
fn product_name_from_filename(path: &Path) -> String {
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let base = base.strip_prefix(EMBEDDING_FILE_PREFIX).unwrap_or(base);
    let base = base.strip_suffix(".jsonl").unwrap_or(base);

    match base.split_once('-') {
        Some((index, name)) if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) => {
            name.to_string()
        }
        _ => base.to_string(),
    }
}

/// Per-chunk metadata, only non-empty values are attached.
fn chunk_metadata(
    product_name: &str,
    book: Option<&str>,
    meta: &ProductMeta,
) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert(
        "book".to_string(),
        book.filter(|b| !b.is_empty())
            .unwrap_or("Unknown")
            .to_string(),
    );

    if !product_name.is_empty() {
        metadata.insert("product_name".to_string(), product_name.to_string());
    }
    if !meta.brand.is_empty() {
        metadata.insert("brand".to_string(), meta.brand.clone());
    }
    if !meta.category.is_empty() {
        metadata.insert("category".to_string(), meta.category.clone());
    }
    if let Some(amazon_url) = &meta.amazon_url {
        if !amazon_url.is_empty() {
            metadata.insert("amazon_url".to_string(), amazon_url.clone());
        }
    }
    if !meta.ewg_url.is_empty() {
        metadata.insert("ewg_url".to_string(), meta.ewg_url.clone());
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_name_strips_prefix_index_and_suffix() {
        let path = PathBuf::from(
            "/data/embeddings-char-split-0000-Cliganic 100% Pure & Natural Neem Oil.jsonl",
        );
        assert_eq!(
            product_name_from_filename(&path),
            "Cliganic 100% Pure & Natural Neem Oil"
        );
    }

    #[test]
    fn product_name_without_index_is_kept_whole() {
        let path = PathBuf::from("embeddings-char-split-Plain Name.jsonl");
        assert_eq!(product_name_from_filename(&path), "Plain Name");
    }

    #[test]
    fn metadata_omits_empty_values() {
        let meta = ProductMeta {
            brand: "CeraVe".to_string(),
            category: String::new(),
            amazon_url: None,
            ewg_url: "https://ewg.example/p".to_string(),
        };

        let metadata = chunk_metadata("Cleanser", Some("Cleanser Book"), &meta);
        assert_eq!(metadata.get("book").unwrap(), "Cleanser Book");
        assert_eq!(metadata.get("product_name").unwrap(), "Cleanser");
        assert_eq!(metadata.get("brand").unwrap(), "CeraVe");
        assert!(!metadata.contains_key("category"));
        assert!(!metadata.contains_key("amazon_url"));
        assert_eq!(metadata.get("ewg_url").unwrap(), "https://ewg.example/p");
    }

    #[test]
    fn missing_book_defaults_to_unknown() {
        let metadata = chunk_metadata("", None, &ProductMeta::default());
        assert_eq!(metadata.get("book").unwrap(), "Unknown");
        assert!(!metadata.contains_key("product_name"));
    }
}
