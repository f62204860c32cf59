use std::convert::Infallible;

use formpart::MultipartReader;
use tokio::io::AsyncRead;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate an `AsyncRead` and the boundary from somewhere e.g. server request body.
    let (reader, boundary) = get_async_reader_from_somewhere().await;

    MultipartReader::with_reader(reader, boundary)
        .for_each_part(|part| {
            println!("Name: {:?}, File Name: {:?}", part.name(), part.file_name());
            println!("Content: {:?}", part.text());
            async { Ok::<_, Infallible>(()) }
        })
        .await?;

    Ok(())
}

async fn get_async_reader_from_somewhere() -> (impl AsyncRead, &'static str) {
    let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY--\r\n";

    (data.as_bytes(), "X-BOUNDARY")
}
