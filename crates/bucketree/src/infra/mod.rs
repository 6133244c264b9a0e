/// S3-compatible storage adapter backed by opendal.
pub mod s3;
/// Abstract object-storage boundary consumed by the indexer.
pub mod storage;
