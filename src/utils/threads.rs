use futures::stream::{self, StreamExt};
use std::future::Future;

/// 以不超过 `max_concurrency` 的并发度执行一组 future
///
/// 结果顺序与输入顺序一致，和完成顺序无关。
pub async fn do_parallel_with_limit<F, T>(futures: Vec<F>, max_concurrency: usize) -> Vec<T>
where
    F: Future<Output = T>,
{
    stream::iter(futures)
        .buffered(max_concurrency.max(1))
        .collect()
        .await
}
