use std::convert::Infallible;

use crate::record::EventRecord;

/// Progress indicator
pub trait Progress {
    fn inc(&self, i: u64);
    fn finish(&self);
}

/// Destination for committed event records
pub trait WriteRecord {
    type Error;

    fn write_record(&mut self, record: &EventRecord) -> Result<(), Self::Error>;

    /// Called once after the last record
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl WriteRecord for Vec<EventRecord> {
    type Error = Infallible;

    fn write_record(&mut self, record: &EventRecord) -> Result<(), Self::Error> {
        self.push(record.clone());
        Ok(())
    }
}

impl<W: WriteRecord + ?Sized> WriteRecord for &mut W {
    type Error = W::Error;

    fn write_record(&mut self, record: &EventRecord) -> Result<(), Self::Error> {
        (**self).write_record(record)
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        (**self).finish()
    }
}
