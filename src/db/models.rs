use imgshelf_schema::ImageRecord;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DbImage {
    pub id: i64,
    pub url: String,
    pub description: String,
}

impl From<DbImage> for ImageRecord {
    fn from(row: DbImage) -> Self {
        ImageRecord {
            id: row.id,
            url: row.url,
            description: row.description,
        }
    }
}
