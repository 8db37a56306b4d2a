use ::tokio_postgres::{Client, Error};

use crate::connection::AsyncConnection;

impl AsyncConnection for Client {
    type Error = Error;

    async fn execute(&mut self, sql: &str) -> Result<(), Error> {
        self.batch_execute(sql).await
    }

    async fn fetch_bool(&mut self, sql: &str) -> Result<bool, Error> {
        let row = self.query_one(sql, &[]).await?;
        row.try_get(0)
    }
}
