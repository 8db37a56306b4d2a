use ::postgres::{Client, Error};

use crate::connection::Connection;

impl Connection for Client {
    type Error = Error;

    fn execute(&mut self, sql: &str) -> Result<(), Error> {
        self.batch_execute(sql)
    }

    fn fetch_bool(&mut self, sql: &str) -> Result<bool, Error> {
        let row = self.query_one(sql, &[])?;
        row.try_get(0)
    }
}
