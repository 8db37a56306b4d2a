use ::sqlx::{Error, PgConnection};

use crate::connection::AsyncConnection;

impl AsyncConnection for PgConnection {
    type Error = Error;

    async fn execute(&mut self, sql: &str) -> Result<(), Error> {
        ::sqlx::query(sql).execute(&mut *self).await?;
        Ok(())
    }

    async fn fetch_bool(&mut self, sql: &str) -> Result<bool, Error> {
        ::sqlx::query_scalar(sql).fetch_one(&mut *self).await
    }
}
