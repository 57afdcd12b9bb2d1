#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Run `f` over every channel and gather the results in channel order.
#[cfg(feature = "rayon")]
pub(crate) fn map_channels<R, F>(channels: Vec<Vec<f64>>, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize, Vec<f64>) -> R + Sync + Send,
{
    channels
        .into_par_iter()
        .enumerate()
        .map(|(i, x)| f(i, x))
        .collect()
}

/// Run `f` over every channel and gather the results in channel order.
#[cfg(not(feature = "rayon"))]
pub(crate) fn map_channels<R, F>(channels: Vec<Vec<f64>>, f: F) -> Vec<R>
where
    F: Fn(usize, Vec<f64>) -> R,
{
    channels
        .into_iter()
        .enumerate()
        .map(|(i, x)| f(i, x))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_keep_channel_order() {
        let channels: Vec<Vec<f64>> = (0..16).map(|c| vec![c as f64; 4]).collect();
        let sums = map_channels(channels, |i, x| (i, x.iter().sum::<f64>()));
        sums.iter()
            .enumerate()
            .for_each(|(c, &(i, s))| assert_eq!((i, s), (c, 4.0 * c as f64)));
    }
}
