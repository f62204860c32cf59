use std::convert::Infallible;

use bytes::Bytes;
use formpart::MultipartReader;
use futures_util::stream::once;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A multipart body and its boundary, e.g. from a server request.
    let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_text_field\"\r\n\r\nabcd\r\n--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"my_file_field\"; filename=\"a-text-file.txt\"\r\nContent-Type: text/plain\r\n\r\nHello world\r\n--X-BOUNDARY--\r\n";
    let stream = once(async move { Result::<Bytes, Infallible>::Ok(Bytes::from(data)) });

    MultipartReader::new(stream, "X-BOUNDARY")
        .for_each_part(|part| {
            println!("Name: {:?}, File Name: {:?}", part.name(), part.file_name());
            println!("Content: {:?}", part.text());
            async { Ok::<_, Infallible>(()) }
        })
        .await?;

    Ok(())
}
